//! Three-legged OAuth 1.0a handshake

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use url::Url;

use super::credential::Credential;
use super::signature::{ConsumerKey, Signer, TokenPair};
use crate::client::ApiEndpoints;
use crate::client::network::check_status;
use crate::config::Permission;
use crate::error::{AuthError, Result, TransportError};

/// Temporary token issued at the start of a handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
}

impl RequestToken {
    fn pair(&self) -> TokenPair {
        TokenPair {
            token: self.token.clone(),
            secret: self.secret.clone(),
        }
    }
}

/// Query parameters carried by a redirect to the callback URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub token: Option<String>,
    pub verifier: Option<String>,
    pub denied: bool,
}

/// Parse `url` as a redirect to `callback_url`.
///
/// Returns `None` when `url` is unparseable or points somewhere else
/// (different scheme, host or path), so stray URLs can be ignored.
pub fn parse_callback(url: &str, callback_url: &str) -> Option<CallbackParams> {
    let url = Url::parse(url.trim()).ok()?;
    let expected = Url::parse(callback_url).ok()?;

    let same_target = url.scheme() == expected.scheme()
        && url.host_str() == expected.host_str()
        && url.port() == expected.port()
        && url.path().trim_end_matches('/') == expected.path().trim_end_matches('/');
    if !same_target {
        return None;
    }

    let mut params = CallbackParams::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "oauth_token" => params.token = Some(value.into_owned()),
            "oauth_verifier" => params.verifier = Some(value.into_owned()),
            "denied" => params.denied = true,
            _ => {}
        }
    }
    Some(params)
}

/// Provider side of the handshake.
///
/// [`AuthorizationService`](super::AuthorizationService) drives the steps and
/// owns the session state; implementations only talk to the provider.
#[async_trait]
pub trait OAuthHandshake: Send + Sync {
    /// Where the provider redirects after the user decides
    fn callback_url(&self) -> &str;

    /// Step 1: obtain a temporary request token
    async fn request_token(&self) -> Result<RequestToken>;

    /// Step 2: page the user visits to grant access
    fn authorize_url(&self, token: &RequestToken) -> Result<String>;

    /// Step 3: trade the request token and verifier for an access token
    async fn exchange(&self, token: &RequestToken, verifier: &str) -> Result<Credential>;
}

/// Handshake against a Flickr-compatible OAuth 1.0a provider
pub struct OAuth1Handshake {
    http: HttpClient,
    consumer: ConsumerKey,
    endpoints: ApiEndpoints,
    callback_url: String,
    permission: Permission,
}

impl OAuth1Handshake {
    pub fn new(
        consumer: ConsumerKey,
        endpoints: ApiEndpoints,
        callback_url: impl Into<String>,
        permission: Permission,
        timeout: Duration,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            http,
            consumer,
            endpoints,
            callback_url: callback_url.into(),
            permission,
        })
    }

    /// Signed GET whose response is a form-encoded parameter list
    async fn signed_get(
        &self,
        endpoint: &str,
        token: Option<&TokenPair>,
        extra: &[(&str, &str)],
    ) -> Result<HashMap<String, String>> {
        let mut url =
            Url::parse(endpoint).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let signed = Signer::new(&self.consumer, token).sign("GET", endpoint, &[], extra);
        url.query_pairs_mut().extend_pairs(signed.iter());

        debug!("OAuth GET {}", endpoint);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(TransportError::from)?;
        let response = check_status(response).await?;
        let body = response.text().await.map_err(TransportError::from)?;

        Ok(url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect())
    }
}

fn required(fields: &mut HashMap<String, String>, name: &str) -> Result<String> {
    fields
        .remove(name)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::TokenExchange(format!("response is missing `{}`", name)).into())
}

#[async_trait]
impl OAuthHandshake for OAuth1Handshake {
    fn callback_url(&self) -> &str {
        &self.callback_url
    }

    async fn request_token(&self) -> Result<RequestToken> {
        let mut fields = self
            .signed_get(
                &self.endpoints.request_token,
                None,
                &[("oauth_callback", &self.callback_url)],
            )
            .await?;

        if fields.get("oauth_callback_confirmed").map(String::as_str) != Some("true") {
            return Err(
                AuthError::TokenExchange("provider did not confirm the callback".into()).into(),
            );
        }

        Ok(RequestToken {
            token: required(&mut fields, "oauth_token")?,
            secret: required(&mut fields, "oauth_token_secret")?,
        })
    }

    fn authorize_url(&self, token: &RequestToken) -> Result<String> {
        let url = Url::parse_with_params(
            &self.endpoints.authorize,
            &[
                ("oauth_token", token.token.as_str()),
                ("perms", self.permission.as_str()),
            ],
        )
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    async fn exchange(&self, token: &RequestToken, verifier: &str) -> Result<Credential> {
        let pair = token.pair();
        let mut fields = self
            .signed_get(
                &self.endpoints.access_token,
                Some(&pair),
                &[("oauth_verifier", verifier)],
            )
            .await?;

        let mut credential = Credential::new(
            required(&mut fields, "oauth_token")?,
            required(&mut fields, "oauth_token_secret")?,
            required(&mut fields, "user_nsid")?,
        );
        credential.username = fields.remove("username").filter(|u| !u.is_empty());
        Ok(credential)
    }
}
