// crates/chatline-rpc/src/error.rs
//
// Mapping from protocol errors to gRPC status codes.

use tonic::Status;

use chatline_core::error::ChatError;

/// Convert a `ChatError` into the `Status` returned to the caller.
pub fn to_status(err: ChatError) -> Status {
    match err {
        ChatError::Unauthenticated(msg) => Status::unauthenticated(msg),
        ChatError::NotFound(msg) => Status::not_found(msg),
        ChatError::InvalidArgument(msg) => Status::invalid_argument(msg),
        ChatError::Io(msg) => Status::unavailable(msg),
        ChatError::Storage(msg) => Status::internal(msg),
    }
}
