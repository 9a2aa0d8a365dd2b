//! HTTP transport for REST calls and photo uploads

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Response, StatusCode};
use url::Url;

use super::decoder::ResponseDecoder;
use super::endpoints::ApiEndpoints;
use super::multipart::{self, FilePart};
use super::rate_limit::RateLimiterSet;
use super::request::{EndpointCategory, HttpMethod, RequestSpec};
use crate::auth::{ConsumerKey, CredentialProvider, Signer, TokenPair};
use crate::completion::CompletionContext;
use crate::error::{Result, TransportError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Client for a Flickr-compatible photo API.
///
/// Every call is bound to a [`ResponseDecoder`] chosen by the caller.
/// Transport failures short-circuit before the decoder runs; both kinds of
/// failure come back as [`crate::Error`].
pub struct NetworkClient {
    http: HttpClient,
    endpoints: ApiEndpoints,
    consumer: ConsumerKey,
    credentials: Arc<dyn CredentialProvider>,
    rate_limiters: RateLimiterSet,
}

/// Fully prepared request, ready to send
struct Outgoing {
    category: EndpointCategory,
    method: HttpMethod,
    url: String,
    params: Vec<(String, String)>,
}

impl NetworkClient {
    pub fn new(
        consumer: ConsumerKey,
        endpoints: ApiEndpoints,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            http,
            endpoints,
            consumer,
            credentials,
            rate_limiters: RateLimiterSet::new(),
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Token to sign with. Calls that require auth go out unsigned when
    /// there is no credential; the provider's 401 reports it.
    fn token_for(&self, requires_auth: bool) -> Option<TokenPair> {
        if !requires_auth {
            return None;
        }
        let token = self.credentials.credential().map(|c| c.token_pair());
        if token.is_none() {
            debug!("No credential available; sending unsigned");
        }
        token
    }

    /// REST calls carry the API key and ask for plain JSON
    fn default_params(&self, category: EndpointCategory) -> Vec<(String, String)> {
        match category {
            EndpointCategory::Rest => vec![
                ("api_key".to_string(), self.consumer.key.clone()),
                ("format".to_string(), "json".to_string()),
                ("nojsoncallback".to_string(), "1".to_string()),
            ],
            EndpointCategory::Upload | EndpointCategory::Replace => Vec::new(),
        }
    }

    fn prepare(&self, spec: &RequestSpec) -> Outgoing {
        let token = self.token_for(spec.requires_auth);
        let url = self.endpoints.url_for(spec.category).to_string();

        let mut params: Vec<(String, String)> = self
            .default_params(spec.category)
            .into_iter()
            .filter(|(k, _)| !spec.parameters.iter().any(|(pk, _)| pk == k))
            .collect();
        params.extend(spec.parameters.iter().cloned());

        if let Some(token) = &token {
            let oauth =
                Signer::new(&self.consumer, Some(token)).sign(spec.method.as_str(), &url, &params, &[]);
            params.extend(oauth);
        }

        Outgoing {
            category: spec.category,
            method: spec.method,
            url,
            params,
        }
    }

    /// Perform a plain request and decode its body
    pub async fn request<D: ResponseDecoder>(
        &self,
        spec: &RequestSpec,
        decoder: &D,
    ) -> Result<D::Output> {
        let outgoing = self.prepare(spec);
        let mut url = Url::parse(&outgoing.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", outgoing.url, e)))?;

        let builder = match outgoing.method {
            HttpMethod::Get => {
                url.query_pairs_mut().extend_pairs(outgoing.params.iter());
                self.http.get(url)
            }
            HttpMethod::Post => {
                let body = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(outgoing.params.iter())
                    .finish();
                self.http
                    .post(url)
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(body)
            }
        };

        debug!(
            "{} {} ({} params)",
            outgoing.method.as_str(),
            outgoing.url,
            outgoing.params.len()
        );
        let bytes = self.send(outgoing.category, builder).await?;
        Ok(decoder.decode(&bytes)?)
    }

    /// Upload a new photo. `parameters` become multipart text fields.
    pub async fn upload<D: ResponseDecoder>(
        &self,
        parameters: &[(String, String)],
        file: FilePart,
        decoder: &D,
    ) -> Result<D::Output> {
        self.send_multipart(EndpointCategory::Upload, parameters.to_vec(), file, decoder)
            .await
    }

    /// Replace the image data of an existing photo
    pub async fn replace<D: ResponseDecoder>(
        &self,
        photo_id: &str,
        file: FilePart,
        decoder: &D,
    ) -> Result<D::Output> {
        let fields = vec![("photo_id".to_string(), photo_id.to_string())];
        self.send_multipart(EndpointCategory::Replace, fields, file, decoder)
            .await
    }

    async fn send_multipart<D: ResponseDecoder>(
        &self,
        category: EndpointCategory,
        mut fields: Vec<(String, String)>,
        file: FilePart,
        decoder: &D,
    ) -> Result<D::Output> {
        let token = self.token_for(true);
        let url = self.endpoints.url_for(category).to_string();

        // The file part is not covered by the signature
        if let Some(token) = &token {
            let oauth = Signer::new(&self.consumer, Some(token)).sign("POST", &url, &fields, &[]);
            fields.extend(oauth);
        }

        debug!(
            "POST {} multipart ({} fields, {} bytes of {})",
            url,
            fields.len(),
            file.bytes.len(),
            file.mime_type
        );
        let encoded = multipart::build(&fields, Some(file));
        let builder = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, encoded.content_type)
            .body(encoded.body);

        let bytes = self.send(category, builder).await?;
        Ok(decoder.decode(&bytes)?)
    }

    async fn send(
        &self,
        category: EndpointCategory,
        builder: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>> {
        self.rate_limiters.wait_for(category).await;

        let response = builder.send().await.map_err(TransportError::from)?;
        let response = match check_status(response).await {
            Ok(response) => response,
            Err(TransportError::RateLimit(retry_after)) => {
                self.rate_limiters.activate(category);
                return Err(TransportError::RateLimit(retry_after).into());
            }
            Err(e) => return Err(e.into()),
        };

        let bytes = response.bytes().await.map_err(TransportError::from)?;
        Ok(bytes.to_vec())
    }

    /// [`request`](Self::request) on the runtime, completing on `context`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request_with_completion<D, F>(
        self: &Arc<Self>,
        spec: RequestSpec,
        decoder: D,
        context: &CompletionContext,
        completion: F,
    ) where
        D: ResponseDecoder + 'static,
        F: FnOnce(Result<D::Output>) + Send + 'static,
    {
        let client = Arc::clone(self);
        let context = context.clone();
        tokio::spawn(async move {
            let outcome = client.request(&spec, &decoder).await;
            context.deliver(outcome, completion);
        });
    }

    /// [`upload`](Self::upload) on the runtime, completing on `context`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn upload_with_completion<D, F>(
        self: &Arc<Self>,
        parameters: Vec<(String, String)>,
        file: FilePart,
        decoder: D,
        context: &CompletionContext,
        completion: F,
    ) where
        D: ResponseDecoder + 'static,
        F: FnOnce(Result<D::Output>) + Send + 'static,
    {
        let client = Arc::clone(self);
        let context = context.clone();
        tokio::spawn(async move {
            let outcome = client.upload(&parameters, file, &decoder).await;
            context.deliver(outcome, completion);
        });
    }
}

/// Map a non-success status to a [`TransportError`]
pub(crate) async fn check_status(
    response: Response,
) -> std::result::Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(TransportError::Unauthorized),
        StatusCode::FORBIDDEN => Err(TransportError::Forbidden),
        StatusCode::NOT_FOUND => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Resource not found".to_string());
            Err(TransportError::NotFound(error_msg))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            Err(TransportError::RateLimit(Duration::from_secs(retry_after)))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Bad request".to_string());
            Err(TransportError::BadRequest(error_msg))
        }
        status if status.is_server_error() => {
            let error_msg = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Server error: {}", status));
            Err(TransportError::ServerError(error_msg))
        }
        _ => Err(TransportError::UnexpectedStatus(status.as_u16())),
    }
}
