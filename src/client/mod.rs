//! Endpoint dispatch client.
//!
//! Turns a [`Target`](crate::target::Target) description into a wire
//! request, submits it once over HTTP, validates the response and decodes
//! the body into a caller-declared type. Offered both as an awaitable call
//! and as a callback form; both run the same pipeline.
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
//! # struct User { id: u64 }
//! # async fn example() -> waypost::Result<()> {
//! let client = Client::new(ClientConfig::with_base_url("https://api.example.com")?)?;
//! let users: Vec<User> = client.dispatch(&ListUsers).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod dispatch;
mod request;

#[cfg(test)]
mod tests;

pub use builder::Client;
pub use config::ClientConfig;
pub use dispatch::DispatchOptions;
pub use request::{build_request, WireRequest};
