//! API endpoint URLs

use super::request::EndpointCategory;

const REST_URL: &str = "https://api.flickr.com/services/rest";
const UPLOAD_URL: &str = "https://up.flickr.com/services/upload/";
const REPLACE_URL: &str = "https://up.flickr.com/services/replace/";
const REQUEST_TOKEN_URL: &str = "https://www.flickr.com/services/oauth/request_token";
const AUTHORIZE_URL: &str = "https://www.flickr.com/services/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://www.flickr.com/services/oauth/access_token";
const SIGNUP_URL: &str = "https://identity.flickr.com/sign-up";

/// Every URL the client and the OAuth handshake talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub rest: String,
    pub upload: String,
    pub replace: String,
    pub request_token: String,
    pub authorize: String,
    pub access_token: String,
    pub signup: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            rest: REST_URL.to_string(),
            upload: UPLOAD_URL.to_string(),
            replace: REPLACE_URL.to_string(),
            request_token: REQUEST_TOKEN_URL.to_string(),
            authorize: AUTHORIZE_URL.to_string(),
            access_token: ACCESS_TOKEN_URL.to_string(),
            signup: SIGNUP_URL.to_string(),
        }
    }
}

impl ApiEndpoints {
    /// All endpoints served from a single host, with production paths
    pub fn with_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        Self {
            rest: format!("{}/services/rest", host),
            upload: format!("{}/services/upload/", host),
            replace: format!("{}/services/replace/", host),
            request_token: format!("{}/services/oauth/request_token", host),
            authorize: format!("{}/services/oauth/authorize", host),
            access_token: format!("{}/services/oauth/access_token", host),
            signup: format!("{}/sign-up", host),
        }
    }

    /// Resolve the URL for an endpoint category
    pub fn url_for(&self, category: EndpointCategory) -> &str {
        match category {
            EndpointCategory::Rest => &self.rest,
            EndpointCategory::Upload => &self.upload,
            EndpointCategory::Replace => &self.replace,
        }
    }
}
