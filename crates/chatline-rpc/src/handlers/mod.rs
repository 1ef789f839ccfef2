// crates/chatline-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module holds the handler functions for one API group; the request and
// response types live in `crate::proto`.

pub mod messages;
pub mod room;
pub mod session;
