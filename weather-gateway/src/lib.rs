//! Router and state for the HTTP gateway, split out of the binary so
//! integration tests can exercise the app with a stub RPC client.

pub mod api;
