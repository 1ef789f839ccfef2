// crates/chatline-rpc/src/middleware.rs
//
// Middleware for the RPC server: logging interceptor and bearer-token auth.
//
// The interceptor runs for every call, including Login, so it only logs.
// Authentication is applied per method by `authenticate`.

use tonic::metadata::{KeyRef, MetadataMap};
use tonic::{Request, Status};

use chatline_core::error::ChatError;
use chatline_store::ChatStore;

/// Metadata key carrying the session token.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// Logging interceptor for tonic gRPC requests.
///
/// Logs which metadata keys arrived. Values are never logged since the
/// authorization entry is a live credential.
pub fn logging_interceptor(req: Request<()>) -> Result<Request<()>, Status> {
    let keys: Vec<&str> = req
        .metadata()
        .keys()
        .map(|key| match key {
            KeyRef::Ascii(k) => k.as_str(),
            KeyRef::Binary(k) => k.as_str(),
        })
        .collect();
    tracing::debug!("Incoming RPC request, metadata keys: {:?}", keys);
    Ok(req)
}

/// Extract the session token from call metadata.
///
/// Accepts either the raw token or `Bearer <token>`. Returns `None` when the
/// entry is missing, not ASCII, empty, or uses another scheme.
pub fn bearer_token(metadata: &MetadataMap) -> Option<&str> {
    let raw = metadata.get(AUTHORIZATION_KEY)?.to_str().ok()?.trim_start();

    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        Some(_) => return None,
        None => raw.trim_end(),
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authenticate a call against the session table.
///
/// Returns the username owning the token. Any valid token is accepted for
/// any room; there is no per-room scoping.
pub fn authenticate(store: &ChatStore, metadata: &MetadataMap) -> Result<String, ChatError> {
    let token = bearer_token(metadata).ok_or_else(|| {
        tracing::warn!("Rejected call without authorization token");
        ChatError::Unauthenticated("missing authorization token".to_string())
    })?;

    match store.username_for(token)? {
        Some(username) => Ok(username),
        None => {
            tracing::warn!("Rejected call with unknown authorization token");
            Err(ChatError::Unauthenticated("not authenticated".to_string()))
        }
    }
}
