//! Zenoh queryable serving a [`Responder`].

use thiserror::Error;
use tracing::{error, info};
use zenoh::Session;

use crate::responder::Responder;
use crate::store::Datastore;

/// Errors raised while setting up the queryable.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Failed to declare queryable on '{key}': {message}")]
    Declare { key: String, message: String },
}

/// Answer queries on `key_expr` until the queryable is closed.
///
/// Queries are handled one at a time, in arrival order. The loop ends when
/// the session is closed.
pub async fn serve<S: Datastore>(
    session: &Session,
    key_expr: &str,
    responder: &mut Responder<S>,
) -> Result<(), ServeError> {
    let queryable =
        session
            .declare_queryable(key_expr)
            .await
            .map_err(|e| ServeError::Declare {
                key: key_expr.to_string(),
                message: e.to_string(),
            })?;

    info!(key = %key_expr, "Responder ready");

    while let Ok(query) = queryable.recv_async().await {
        let frame = query
            .payload()
            .map(|payload| payload.to_bytes().into_owned())
            .unwrap_or_default();

        info!(bytes = frame.len(), "Request received");

        let reply = responder.respond(&frame).await;
        let reply_len = reply.len();

        match query.reply(query.key_expr().clone(), reply).await {
            Ok(()) => info!(bytes = reply_len, "Response sent"),
            Err(e) => error!("Error when sending response: {}", e),
        }
    }

    info!(key = %key_expr, "Responder stopped");

    Ok(())
}
