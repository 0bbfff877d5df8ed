//! Waypost
//!
//! Declarative HTTP endpoint dispatch: describe an endpoint once as a
//! [`Target`] (URL, path, method, headers, body, query, encoding,
//! timeout), then let the [`Client`] build the wire request, submit it,
//! validate the response and decode the body into your own type. Every
//! failure is classified into one [`ApiError`] variant.
//!
//! # Features
//!
//! - **Declarative targets**: one trait impl per logical call site, with
//!   sensible defaults for everything except the path
//! - **Typed results**: responses decode straight into `serde` types, with
//!   configurable key and date strategies
//! - **Two call shapes**: awaitable and callback-based, sharing one
//!   pipeline
//! - **Injectable diagnostics**: per-request or client-wide request/response
//!   reporting through a pluggable sink
//!
//! # Example
//!
//! ```rust,no_run
//! use waypost::{Client, ClientConfig, Target};
//!
//! struct ListUsers;
//!
//! impl Target for ListUsers {
//!     fn path(&self) -> &str {
//!         "v1/users"
//!     }
//! }
//!
//! # #[derive(serde::Deserialize)]
//! # struct User { id: u64, name: String }
//! # async fn example() -> waypost::Result<()> {
//! let client = Client::new(ClientConfig::with_base_url("https://api.example.com")?)?;
//! let users: Vec<User> = client.dispatch(&ListUsers).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod target;

pub use client::{build_request, Client, ClientConfig, DispatchOptions, WireRequest};
pub use decode::{DateDecodingStrategy, KeyDecodingStrategy};
pub use diagnostics::{DiagnosticReport, DiagnosticSink, TracingSink};
pub use error::{ApiError, Result};
pub use target::{Body, Encoding, Method, QueryItem, Target, DEFAULT_TIMEOUT};

/// Prelude module for convenient imports.
///
/// ```rust
/// use waypost::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::{Client, ClientConfig, DispatchOptions};
    pub use crate::decode::{DateDecodingStrategy, KeyDecodingStrategy};
    pub use crate::diagnostics::{DiagnosticReport, DiagnosticSink};
    pub use crate::error::{ApiError, Result};
    pub use crate::logging::{init_logging, try_init_logging, LogConfig, LogFormat, LogLevel};
    pub use crate::target::{Body, Encoding, Method, QueryItem, Target};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
