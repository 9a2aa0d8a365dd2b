//! Network and persistence core for a Flickr-compatible photo client
//!
//! - [`client`]: request pipeline with pluggable response decoders and
//!   multipart uploads
//! - [`auth`]: OAuth 1.0a session management
//! - [`cache`]: in-memory keyed object cache
//! - [`store`]: typed durable settings
//! - [`completion`]: single execution context for completion callbacks

pub mod auth;
pub mod cache;
pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod store;

pub use error::{Error, ErrorKind, Result};
