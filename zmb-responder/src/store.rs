//! Path-keyed data point stores.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zmb_common::{Path, Value};

/// Errors raised by a [`Datastore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("UNKNOWN PATH: {0}")]
    UnknownPath(String),

    #[error("READ ONLY PATH: {0}")]
    ReadOnly(String),

    #[error("TYPE MISMATCH: {path} holds a {expected} value")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("OUT OF RANGE: {path} holds a {data_type} value")]
    OutOfRange { path: String, data_type: DataType },
}

/// Register interpretation of a numeric point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    I16,
    /// Unsigned 32-bit integer (2 registers)
    U32,
    /// Signed 32-bit integer (2 registers)
    I32,
    /// 32-bit float (2 registers)
    F32,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::U16 => "u16",
            DataType::I16 => "i16",
            DataType::U32 => "u32",
            DataType::I32 => "i32",
            DataType::F32 => "f32",
        }
    }

    /// Whether `value` fits in a register of this type.
    ///
    /// Integer types take integral values in range only. `f32` takes any
    /// finite number within the `f32` range.
    pub fn accepts(&self, value: Value) -> bool {
        let (min, max) = match self {
            DataType::U16 => (u16::MIN as i64, u16::MAX as i64),
            DataType::I16 => (i16::MIN as i64, i16::MAX as i64),
            DataType::U32 => (u32::MIN as i64, u32::MAX as i64),
            DataType::I32 => (i32::MIN as i64, i32::MAX as i64),
            DataType::F32 => {
                return value
                    .as_f64()
                    .is_some_and(|v| v.is_finite() && v.abs() <= f32::MAX as f64);
            }
        };

        match value {
            Value::Integer(i) => (min..=max).contains(&i),
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backing store addressed by path.
///
/// A Modbus-backed implementation maps each path onto a register or coil of
/// a slave; [`MemoryStore`] keeps values in memory.
pub trait Datastore: Send {
    /// Read the current value at `path`.
    fn read(&mut self, path: &str) -> impl Future<Output = Result<Value, StoreError>> + Send;

    /// Write `value` at `path`.
    fn write(
        &mut self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-memory [`Datastore`].
///
/// Only known paths can be written, and a boolean point only accepts
/// booleans while a numeric point only accepts numbers. A numeric point
/// given a [`DataType`] also refuses values outside that type's range.
/// Read-only points model discrete inputs and input registers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    points: BTreeMap<Path, Value>,
    read_only: BTreeSet<Path>,
    data_types: BTreeMap<Path, DataType>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a writable point.
    pub fn with_point(mut self, path: impl Into<Path>, value: impl Into<Value>) -> Self {
        self.insert(path, value);
        self
    }

    /// Add a read-only point.
    pub fn with_read_only_point(mut self, path: impl Into<Path>, value: impl Into<Value>) -> Self {
        let path = path.into();
        self.read_only.insert(path.clone());
        self.points.insert(path, value.into());
        self
    }

    /// Add a writable numeric point constrained to `data_type`.
    pub fn with_typed_point(
        mut self,
        path: impl Into<Path>,
        value: impl Into<Value>,
        data_type: DataType,
    ) -> Self {
        let path = path.into();
        self.data_types.insert(path.clone(), data_type);
        self.points.insert(path, value.into());
        self
    }

    /// Insert or replace a point, bypassing write checks.
    pub fn insert(&mut self, path: impl Into<Path>, value: impl Into<Value>) {
        self.points.insert(path.into(), value.into());
    }

    /// Mark an existing point read-only. Returns `false` if the path is unknown.
    pub fn mark_read_only(&mut self, path: &str) -> bool {
        if self.points.contains_key(path) {
            self.read_only.insert(path.to_string());
            true
        } else {
            false
        }
    }

    /// Constrain an existing point to `data_type`. Returns `false` if the
    /// path is unknown.
    pub fn set_data_type(&mut self, path: &str, data_type: DataType) -> bool {
        if self.points.contains_key(path) {
            self.data_types.insert(path.to_string(), data_type);
            true
        } else {
            false
        }
    }

    pub fn data_type(&self, path: &str) -> Option<DataType> {
        self.data_types.get(path).copied()
    }

    pub fn value(&self, path: &str) -> Option<Value> {
        self.points.get(path).copied()
    }

    pub fn is_read_only(&self, path: &str) -> bool {
        self.read_only.contains(path)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&Path, &Value)> {
        self.points.iter()
    }
}

impl<P: Into<Path>, V: Into<Value>> FromIterator<(P, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut store = MemoryStore::new();
        for (path, value) in iter {
            store.insert(path, value);
        }
        store
    }
}

impl Datastore for MemoryStore {
    async fn read(&mut self, path: &str) -> Result<Value, StoreError> {
        self.value(path)
            .ok_or_else(|| StoreError::UnknownPath(path.to_string()))
    }

    async fn write(&mut self, path: &str, value: Value) -> Result<(), StoreError> {
        if self.is_read_only(path) {
            return Err(StoreError::ReadOnly(path.to_string()));
        }

        let current = self
            .points
            .get_mut(path)
            .ok_or_else(|| StoreError::UnknownPath(path.to_string()))?;

        match (*current, value) {
            (Value::Bool(_), Value::Bool(_)) => {}
            (Value::Bool(_), _) => {
                return Err(StoreError::TypeMismatch {
                    path: path.to_string(),
                    expected: "boolean",
                });
            }
            (_, Value::Bool(_)) => {
                return Err(StoreError::TypeMismatch {
                    path: path.to_string(),
                    expected: "numeric",
                });
            }
            _ => {}
        }

        if let Some(&data_type) = self.data_types.get(path) {
            if !data_type.accepts(value) {
                return Err(StoreError::OutOfRange {
                    path: path.to_string(),
                    data_type,
                });
            }
        }

        *current = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_point("/plc/1/coil_a", false)
            .with_point("/plc/1/holding_b", 5)
            .with_read_only_point("/plc/1/input_c", 1.23)
    }

    #[tokio::test]
    async fn test_read_known_and_unknown() {
        let mut store = store();
        assert_eq!(store.read("/plc/1/holding_b").await, Ok(Value::Integer(5)));
        assert_eq!(
            store.read("/plc/1/nope").await,
            Err(StoreError::UnknownPath("/plc/1/nope".to_string()))
        );
    }

    #[tokio::test]
    async fn test_write_updates_value() {
        let mut store = store();
        store.write("/plc/1/holding_b", Value::Integer(123)).await.unwrap();
        store.write("/plc/1/coil_a", Value::Bool(true)).await.unwrap();

        assert_eq!(store.value("/plc/1/holding_b"), Some(Value::Integer(123)));
        assert_eq!(store.value("/plc/1/coil_a"), Some(Value::Bool(true)));
    }

    #[tokio::test]
    async fn test_write_refusals() {
        let mut store = store();

        assert!(matches!(
            store.write("/plc/1/input_c", Value::Float(2.0)).await,
            Err(StoreError::ReadOnly(_))
        ));
        assert!(matches!(
            store.write("/plc/1/unknown", Value::Integer(1)).await,
            Err(StoreError::UnknownPath(_))
        ));
        assert!(matches!(
            store.write("/plc/1/coil_a", Value::Integer(1)).await,
            Err(StoreError::TypeMismatch { expected: "boolean", .. })
        ));
        assert!(matches!(
            store.write("/plc/1/holding_b", Value::Bool(true)).await,
            Err(StoreError::TypeMismatch { expected: "numeric", .. })
        ));

        // Refused writes leave the store untouched.
        assert_eq!(store.value("/plc/1/input_c"), Some(Value::Float(1.23)));
        assert_eq!(store.value("/plc/1/holding_b"), Some(Value::Integer(5)));
    }

    #[test]
    fn test_data_type_ranges() {
        assert!(DataType::U16.accepts(Value::Integer(65535)));
        assert!(!DataType::U16.accepts(Value::Integer(65536)));
        assert!(!DataType::U16.accepts(Value::Integer(-1)));
        assert!(DataType::I16.accepts(Value::Integer(-32768)));
        assert!(!DataType::I16.accepts(Value::Integer(32768)));
        assert!(DataType::U32.accepts(Value::Integer(4_294_967_295)));
        assert!(!DataType::I32.accepts(Value::Integer(2_147_483_648)));
        assert!(!DataType::U32.accepts(Value::Unsigned(u64::MAX)));
        assert!(!DataType::U16.accepts(Value::Float(1.5)));
        assert!(DataType::F32.accepts(Value::Float(1.5)));
        assert!(DataType::F32.accepts(Value::Integer(7)));
        assert!(!DataType::F32.accepts(Value::Float(1e300)));
        assert!(!DataType::F32.accepts(Value::Bool(true)));
    }

    #[tokio::test]
    async fn test_typed_point_refuses_out_of_range() {
        let mut store = MemoryStore::new().with_typed_point("/plc/1/hr0", 10, DataType::U16);

        store.write("/plc/1/hr0", Value::Integer(65535)).await.unwrap();
        assert_eq!(
            store.write("/plc/1/hr0", Value::Integer(70000)).await,
            Err(StoreError::OutOfRange {
                path: "/plc/1/hr0".to_string(),
                data_type: DataType::U16,
            })
        );
        assert!(matches!(
            store.write("/plc/1/hr0", Value::Float(2.5)).await,
            Err(StoreError::OutOfRange { .. })
        ));
        assert_eq!(store.value("/plc/1/hr0"), Some(Value::Integer(65535)));
    }

    #[test]
    fn test_set_data_type() {
        let mut store = store();
        assert!(store.set_data_type("/plc/1/holding_b", DataType::I16));
        assert!(!store.set_data_type("/plc/1/nope", DataType::I16));
        assert_eq!(store.data_type("/plc/1/holding_b"), Some(DataType::I16));
        assert_eq!(store.data_type("/plc/1/coil_a"), None);
    }

    #[test]
    fn test_from_iter_and_read_only_marking() {
        let mut store: MemoryStore = [("/a", 1), ("/b", 2)].into_iter().collect();
        assert_eq!(store.len(), 2);
        assert!(store.mark_read_only("/a"));
        assert!(!store.mark_read_only("/c"));
        assert!(store.is_read_only("/a"));
        assert!(!store.is_read_only("/b"));
    }
}
