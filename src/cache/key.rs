//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Generate a deterministic cache key for a request.
///
/// The key is a SHA-256 hash of the endpoint and the sorted parameters, so
/// the same request yields the same key regardless of parameter order.
pub fn request_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(endpoint.as_bytes());
    hasher.update(b"|");

    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort();

    for (k, v) in sorted_params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
