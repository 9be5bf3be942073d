//! Core components for signed Azure REST clients.
//!
//! This crate provides the foundational types shared by the azrest service
//! clients: the error type, the transport abstraction, the signing
//! primitives, and response validation.
//!
//! ## Overview
//!
//! - **Context**: holds the [`HttpSend`] transport and the [`Env`] used to
//!   load configuration.
//! - **Signing**: [`hash::sign`] is the HMAC-SHA256 primitive every Azure
//!   scheme builds on; [`SigningRequest`] helps build canonical strings from
//!   request parts.
//! - **Responses**: [`response::ensure_status`] and [`response::decode`]
//!   implement the status check and body shaping used by all clients.
//!
//! ## Example
//!
//! ```
//! use azrest_core::hash::{base64_encode, sign};
//!
//! let key = base64_encode(b"account-key");
//! let signature = sign(&key, "get\ndbs\n\ntue, 01 mar 2022 08:02:04 gmt\n\n").unwrap();
//! assert_eq!(signature.len(), 44);
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod response;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::NoopHttpSend;
mod env;
pub use env::Env;
pub use env::OsEnv;
pub use env::StaticEnv;
mod error;
pub use error::{Error, ErrorKind, Result};
mod transport;
pub use transport::Body;
pub use transport::HttpSend;
mod request;
pub use request::SigningRequest;
pub use response::{Output, ResultShape, StatusPolicy};
