// crates/chatline-rpc/src/handlers/session.rs
//
// Session handler: Login.

use chatline_core::error::ChatError;
use chatline_store::ChatStore;

use crate::proto::{LoginRequest, LoginResponse};

/// Handle a Login request.
///
/// Issues a fresh token for the username, replacing any earlier one. The
/// password is not checked.
pub async fn handle_login(
    store: &ChatStore,
    request: LoginRequest,
) -> Result<LoginResponse, ChatError> {
    let token = store.login(&request.username, &request.password)?;

    tracing::info!("User {} logged in", request.username);

    Ok(LoginResponse {
        token,
        message: "Login successful".to_string(),
    })
}
