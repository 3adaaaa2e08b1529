use std::fmt;
use std::str::FromStr;

use zenoh::key_expr::KeyExpr;

use crate::error::{Error, Result};

/// Default key expression prefix for ZMB responders.
pub const KEY_PREFIX: &str = "zmb";

/// Location of one responder.
///
/// Written as `<key-expr>[@<locator>[,<locator>...]]`, for example
/// `zmb/plant` or `zmb/plant@tcp/10.0.0.5:7447`. The key expression selects
/// the responder; locators are extra Zenoh endpoints to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    key_expr: String,
    locators: Vec<String>,
}

impl Address {
    /// Create an address for a key expression with no extra locators.
    pub fn new(key_expr: impl Into<String>) -> Result<Self> {
        let key_expr = key_expr.into();
        validate_key_expr(&key_expr)?;
        Ok(Self {
            key_expr,
            locators: Vec::new(),
        })
    }

    /// Address of the responder named `name` under [`KEY_PREFIX`].
    ///
    /// # Example
    /// ```
    /// use zmb_common::address::Address;
    ///
    /// let address = Address::named("plant").unwrap();
    /// assert_eq!(address.key_expr(), "zmb/plant");
    /// ```
    pub fn named(name: &str) -> Result<Self> {
        Self::new(format!("{}/{}", KEY_PREFIX, name))
    }

    pub fn key_expr(&self) -> &str {
        &self.key_expr
    }

    pub fn locators(&self) -> &[String] {
        &self.locators
    }
}

fn validate_key_expr(key_expr: &str) -> Result<()> {
    if key_expr.contains('*') {
        return Err(Error::Address(format!(
            "'{}' is a wildcard, a responder address must name one queryable",
            key_expr
        )));
    }

    KeyExpr::try_from(key_expr)
        .map(|_| ())
        .map_err(|e| Error::Address(format!("'{}': {}", key_expr, e)))
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (key_expr, locators) = match s.split_once('@') {
            Some((key_expr, locators)) => (key_expr, Some(locators)),
            None => (s, None),
        };

        let mut address = Address::new(key_expr.trim())?;

        if let Some(locators) = locators {
            for locator in locators.split(',').map(str::trim) {
                if locator.is_empty() {
                    return Err(Error::Address(format!("empty locator in '{}'", s)));
                }
                address.locators.push(locator.to_string());
            }
        }

        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_expr)?;
        if !self.locators.is_empty() {
            write!(f, "@{}", self.locators.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_only() {
        let address: Address = "zmb/plant".parse().unwrap();
        assert_eq!(address.key_expr(), "zmb/plant");
        assert!(address.locators().is_empty());
        assert_eq!(address.to_string(), "zmb/plant");
    }

    #[test]
    fn test_parse_with_locators() {
        let address: Address = "zmb/plant@tcp/10.0.0.5:7447, udp/10.0.0.6:7447"
            .parse()
            .unwrap();
        assert_eq!(address.key_expr(), "zmb/plant");
        assert_eq!(
            address.locators(),
            ["tcp/10.0.0.5:7447", "udp/10.0.0.6:7447"]
        );
        assert_eq!(
            address.to_string(),
            "zmb/plant@tcp/10.0.0.5:7447,udp/10.0.0.6:7447"
        );
    }

    #[test]
    fn test_reject_wildcards() {
        assert!("zmb/*".parse::<Address>().is_err());
        assert!("zmb/**".parse::<Address>().is_err());
    }

    #[test]
    fn test_reject_invalid() {
        assert!("".parse::<Address>().is_err());
        assert!("zmb/plant@".parse::<Address>().is_err());
        assert!("zmb//plant".parse::<Address>().is_err());
        assert!("/zmb/plant".parse::<Address>().is_err());
    }

    #[test]
    fn test_named() {
        let address = Address::named("line1").unwrap();
        assert_eq!(address.key_expr(), "zmb/line1");
    }
}
