//! HTTP utilities shared by console transports.

pub mod client;
pub mod problem;
pub mod trace;
