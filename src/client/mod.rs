//! Photo API client

pub mod decoder;
pub mod endpoints;
pub mod models;
pub mod multipart;
pub mod network;
pub mod rate_limit;
pub mod request;

pub use decoder::{JsonDecoder, ResponseDecoder, ScalarXmlDecoder, TextDecoder, VoidDecoder};
pub use endpoints::ApiEndpoints;
pub use multipart::{EncodedBody, FilePart, MultipartBody};
pub use network::NetworkClient;
pub use rate_limit::RateLimiterSet;
pub use request::{EndpointCategory, HttpMethod, RequestSpec};
