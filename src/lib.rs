//! Credential-holding relay for the Gemini generative-language API
//!
//! Accepts chat-style generation requests from client applications, attaches
//! a server-side API key, forwards the request upstream, and returns the
//! upstream response or a normalized JSON error.

pub mod adapter;
pub mod error;
pub mod models;
pub mod server;
pub mod upstream;

pub use adapter::RequestAdapter;
pub use error::{Error, Result};
