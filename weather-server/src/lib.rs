//! Router and state for the weather RPC service, split out of the binary
//! so integration tests can exercise the app without opening sockets.

pub mod api;
