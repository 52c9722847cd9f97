//! # console-kit
//!
//! HTTP plumbing for the console's remote collections: an injected
//! [`Session`], a traced `reqwest` client and RFC 9457 problem parsing.

pub mod http;
pub mod session;

pub use http::client::TracedClient;
pub use http::problem::{describe_error_body, Problem, APPLICATION_PROBLEM_JSON};
pub use session::{Session, SessionError};
