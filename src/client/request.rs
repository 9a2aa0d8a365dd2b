//! Per-call request description

use crate::cache::request_key;

/// Which family of endpoint a call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointCategory {
    /// General REST methods (`method=...` parameter selects the operation)
    Rest,
    /// New photo uploads
    Upload,
    /// Binary replacement of an existing photo
    Replace,
}

impl EndpointCategory {
    /// All endpoint categories for initialization.
    pub const ALL: [EndpointCategory; 3] = [
        EndpointCategory::Rest,
        EndpointCategory::Upload,
        EndpointCategory::Replace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointCategory::Rest => "rest",
            EndpointCategory::Upload => "upload",
            EndpointCategory::Replace => "replace",
        }
    }
}

/// HTTP verb for plain requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Description of one plain (non-upload) request. Built per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub category: EndpointCategory,
    pub parameters: Vec<(String, String)>,
    pub method: HttpMethod,
    pub requires_auth: bool,
}

impl RequestSpec {
    /// Authenticated GET against the REST endpoint for `method`
    pub fn rest(method: &str) -> Self {
        Self {
            category: EndpointCategory::Rest,
            parameters: vec![("method".to_string(), method.to_string())],
            method: HttpMethod::Get,
            requires_auth: true,
        }
    }

    pub fn new(category: EndpointCategory, method: HttpMethod) -> Self {
        Self {
            category,
            parameters: Vec::new(),
            method,
            requires_auth: true,
        }
    }

    /// Add a parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }

    pub fn post(mut self) -> Self {
        self.method = HttpMethod::Post;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Deterministic cache key for the decoded response of this request
    pub fn cache_key(&self) -> String {
        let params: Vec<(&str, &str)> = self
            .parameters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        request_key(self.category.as_str(), &params)
    }
}
