//! OAuth 1.0a request signing (HMAC-SHA1)

use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal, everything else is encoded
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Application credentials issued by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerKey {
    pub key: String,
    pub secret: String,
}

impl ConsumerKey {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// A token/secret pair (temporary request token or access token)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

/// Per-request inputs that normally come from the clock and RNG
#[derive(Debug, Clone)]
pub struct Nonce {
    pub nonce: String,
    pub timestamp: u64,
}

impl Nonce {
    pub fn generate() -> Self {
        let nonce = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
        Self { nonce, timestamp }
    }
}

/// Percent-encode per RFC 3986 as OAuth requires
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Signs requests for one consumer and optional token
pub struct Signer<'a> {
    consumer: &'a ConsumerKey,
    token: Option<&'a TokenPair>,
}

impl<'a> Signer<'a> {
    pub fn new(consumer: &'a ConsumerKey, token: Option<&'a TokenPair>) -> Self {
        Self { consumer, token }
    }

    /// Produce the `oauth_*` parameters, signature included, for a request.
    ///
    /// `params` are the request's own parameters (query or form fields);
    /// `extra` are additional protocol parameters such as `oauth_callback`
    /// or `oauth_verifier`. `url` must not carry a query string.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra: &[(&str, &str)],
    ) -> Vec<(String, String)> {
        self.sign_with(method, url, params, extra, &Nonce::generate())
    }

    pub fn sign_with(
        &self,
        method: &str,
        url: &str,
        params: &[(String, String)],
        extra: &[(&str, &str)],
        nonce: &Nonce,
    ) -> Vec<(String, String)> {
        let mut oauth: Vec<(String, String)> = vec![
            ("oauth_consumer_key".to_string(), self.consumer.key.clone()),
            ("oauth_nonce".to_string(), nonce.nonce.clone()),
            (
                "oauth_signature_method".to_string(),
                SIGNATURE_METHOD.to_string(),
            ),
            ("oauth_timestamp".to_string(), nonce.timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = self.token {
            oauth.push(("oauth_token".to_string(), token.token.clone()));
        }
        oauth.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let base = base_string(method, url, params.iter().chain(oauth.iter()));
        let signature = self.signature(&base);
        oauth.push(("oauth_signature".to_string(), signature));
        oauth
    }

    fn signing_key(&self) -> String {
        format!(
            "{}&{}",
            encode(&self.consumer.secret),
            self.token.map(|t| encode(&t.secret)).unwrap_or_default()
        )
    }

    fn signature(&self, base: &str) -> String {
        let mut mac = match HmacSha1::new_from_slice(self.signing_key().as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        };
        mac.update(base.as_bytes());
        general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Signature base string: METHOD&url&normalized-parameters
pub fn base_string<'p, I>(method: &str, url: &str, params: I) -> String
where
    I: IntoIterator<Item = &'p (String, String)>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&normalized)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_unreserved_and_reserved() {
        assert_eq!(encode("abc-._~XYZ019"), "abc-._~XYZ019");
        assert_eq!(encode("a b&c=d/e"), "a%20b%26c%3Dd%2Fe");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_reference_signature() {
        // Worked example from RFC 5849 section 3.4.1
        let consumer = ConsumerKey::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let token = TokenPair {
            token: "nnch734d00sl2jdk".to_string(),
            secret: "pfkkdhi9sl3r4s00".to_string(),
        };
        let nonce = Nonce {
            nonce: "kllo9940pd9333jh".to_string(),
            timestamp: 1191242096,
        };
        let params = pairs(&[("file", "vacation.jpg"), ("size", "original")]);

        let signer = Signer::new(&consumer, Some(&token));
        let signed = signer.sign_with(
            "GET",
            "http://photos.example.net/photos",
            &params,
            &[],
            &nonce,
        );

        let unsigned: Vec<_> = signed
            .iter()
            .filter(|(k, _)| k != "oauth_signature")
            .cloned()
            .collect();
        let base = base_string(
            "GET",
            "http://photos.example.net/photos",
            params.iter().chain(unsigned.iter()),
        );
        assert_eq!(
            base,
            "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26\
             oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26\
             oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26\
             oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
        );

        let signature = signed
            .iter()
            .find(|(k, _)| k == "oauth_signature")
            .map(|(_, v)| v.as_str());
        assert_eq!(signature, Some("tR3+Ty81lMeYAr/Fid0kMTYa/WM="));
    }

    #[test]
    fn test_sign_without_token_has_no_oauth_token() {
        let consumer = ConsumerKey::new("key", "secret");
        let signed = Signer::new(&consumer, None).sign(
            "GET",
            "https://example.com/request_token",
            &[],
            &[("oauth_callback", "photoop://cb")],
        );

        assert!(signed.iter().all(|(k, _)| k != "oauth_token"));
        assert!(signed.iter().any(|(k, v)| k == "oauth_callback" && v == "photoop://cb"));
        assert!(signed.iter().any(|(k, _)| k == "oauth_signature"));
    }

    #[test]
    fn test_signing_key_without_token() {
        let consumer = ConsumerKey::new("key", "s&cret");
        let signer = Signer::new(&consumer, None);
        assert_eq!(signer.signing_key(), "s%26cret&");
    }

    #[test]
    fn test_nonces_differ() {
        let a = Nonce::generate();
        let b = Nonce::generate();
        assert_ne!(a.nonce, b.nonce);
        assert_eq!(a.nonce.len(), 32);
    }
}
