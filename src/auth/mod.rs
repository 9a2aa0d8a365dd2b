//! OAuth session management
//!
//! [`AuthorizationService`] owns the session state machine
//!
//! ```text
//! LoggedOut ──login──▶ AwaitingAuthorization ──callback + exchange──▶ LoggedIn
//!     ▲                        │ cancel / deny / error                  │
//!     └────────────────────────┴──────────────logout────────────────────┘
//! ```
//!
//! Only one handshake can be in flight. Its completion lives in a single
//! pending slot that is resolved exactly once: by a matching callback, by
//! [`cancel_login`](AuthorizationService::cancel_login), by
//! [`logout`](AuthorizationService::logout), or by being dropped.

pub mod credential;
pub mod handshake;
pub mod signature;
pub mod surface;

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use tokio::sync::oneshot;

use crate::completion::CompletionContext;
use crate::error::{AuthError, Result};
use crate::store::{Setting, SettingsStore};

pub use credential::Credential;
pub use handshake::{CallbackParams, OAuth1Handshake, OAuthHandshake, RequestToken, parse_callback};
pub use signature::{ConsumerKey, Signer, TokenPair};
pub use surface::AuthorizationSurface;

/// Settings key holding the persisted [`Credential`]
pub const CREDENTIAL_KEY: &str = "credential";

/// Session state as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    AwaitingAuthorization,
    LoggedIn,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::LoggedOut => "logged out",
            SessionState::AwaitingAuthorization => "awaiting authorization",
            SessionState::LoggedIn => "logged in",
        };
        write!(f, "{}", s)
    }
}

/// Source of the credential used to sign requests
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> Option<Credential>;
}

/// Resolves to the verifier from the callback, or the reason there is none
type VerifierSender = oneshot::Sender<std::result::Result<String, AuthError>>;

struct Pending {
    expected_token: Option<String>,
    tx: VerifierSender,
}

impl Pending {
    fn resolve(self, outcome: std::result::Result<String, AuthError>) {
        // The login future may already be gone
        let _ = self.tx.send(outcome);
    }
}

#[derive(Default)]
struct Session {
    credential: Option<Credential>,
    pending: Option<Pending>,
    /// Id of the login currently allowed to finish
    active_login: Option<u64>,
    next_login: u64,
}

impl Session {
    fn state(&self) -> SessionState {
        if self.active_login.is_some() {
            SessionState::AwaitingAuthorization
        } else if self.credential.is_some() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }
}

/// OAuth session manager
pub struct AuthorizationService {
    handshake: Arc<dyn OAuthHandshake>,
    stored: Setting<Option<Credential>>,
    signup_url: String,
    session: Mutex<Session>,
}

impl AuthorizationService {
    /// Create the service, restoring a previously persisted credential
    pub fn new(
        handshake: Arc<dyn OAuthHandshake>,
        store: Arc<SettingsStore>,
        signup_url: impl Into<String>,
    ) -> Self {
        let stored = Setting::new(store, CREDENTIAL_KEY, None);
        let credential: Option<Credential> = stored.get();
        if let Some(cred) = &credential {
            debug!("Restored session for {}", cred.display_name());
        }

        Self {
            handshake,
            stored,
            signup_url: signup_url.into(),
            session: Mutex::new(Session {
                credential,
                ..Session::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.lock().credential.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.credential().is_some()
    }

    /// Run the handshake, presenting the provider's page on `surface`.
    ///
    /// Fails with [`AuthError::HandshakeInProgress`] while another login is
    /// waiting. Logging in again while logged in is allowed; the previous
    /// credential stays active until the new one is persisted.
    pub async fn login(&self, surface: &dyn AuthorizationSurface) -> Result<Credential> {
        let (id, rx) = {
            let mut session = self.lock();
            if session.active_login.is_some() {
                return Err(AuthError::HandshakeInProgress.into());
            }
            let (tx, rx) = oneshot::channel();
            let id = session.next_login;
            session.next_login += 1;
            session.active_login = Some(id);
            session.pending = Some(Pending {
                expected_token: None,
                tx,
            });
            (id, rx)
        };

        // Releases the session if this future is dropped before it finishes
        let _guard = LoginGuard { service: self, id };

        info!("Starting OAuth handshake");
        let outcome = self.run_handshake(id, surface, rx).await;
        self.finish_login(id, outcome)
    }

    /// [`login`](Self::login), delivering the outcome on `context`
    pub fn login_with_completion<F>(
        self: &Arc<Self>,
        surface: Arc<dyn AuthorizationSurface>,
        context: &CompletionContext,
        completion: F,
    ) where
        F: FnOnce(Result<Credential>) + Send + 'static,
    {
        let service = Arc::clone(self);
        let context = context.clone();
        tokio::spawn(async move {
            let outcome = service.login(surface.as_ref()).await;
            context.deliver(outcome, completion);
        });
    }

    async fn run_handshake(
        &self,
        id: u64,
        surface: &dyn AuthorizationSurface,
        rx: oneshot::Receiver<std::result::Result<String, AuthError>>,
    ) -> Result<Credential> {
        let request_token = self.handshake.request_token().await?;

        {
            let mut guard = self.lock();
            let session = &mut *guard;
            match session.pending.as_mut() {
                Some(pending) if session.active_login == Some(id) => {
                    pending.expected_token = Some(request_token.token.clone());
                }
                _ => return Err(AuthError::Cancelled.into()),
            }
        }

        let url = self.handshake.authorize_url(&request_token)?;
        debug!("Presenting authorization page {}", url);
        surface.present(&url)?;

        let verifier = match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(AuthError::Cancelled),
        };
        surface.dismiss();

        let verifier = verifier?;
        self.handshake.exchange(&request_token, &verifier).await
    }

    fn finish_login(&self, id: u64, outcome: Result<Credential>) -> Result<Credential> {
        let mut session = self.lock();
        if session.active_login != Some(id) {
            // Superseded by logout while the exchange was running
            return Err(AuthError::Cancelled.into());
        }
        session.active_login = None;
        session.pending = None;

        let credential = match outcome {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Login failed: {}", e);
                return Err(e);
            }
        };

        if let Err(e) = self.stored.set(&Some(credential.clone())) {
            warn!("Login succeeded but the credential could not be saved: {}", e);
            return Err(e.into());
        }

        info!("Logged in as {}", credential.display_name());
        session.credential = Some(credential.clone());
        Ok(credential)
    }

    /// Route a redirect URL into the waiting handshake.
    ///
    /// Returns whether the URL was consumed. URLs that are not redirects to
    /// the callback address, or that arrive with no handshake waiting, are
    /// ignored.
    pub fn handle_callback(&self, url: &str) -> bool {
        let Some(params) = parse_callback(url, self.handshake.callback_url()) else {
            debug!("Ignoring non-callback URL");
            return false;
        };

        let mut session = self.lock();
        match session.pending.as_ref() {
            None => {
                debug!("Ignoring callback: no handshake in flight");
                return false;
            }
            Some(pending) if pending.expected_token.is_none() => {
                debug!("Ignoring callback: request token not issued yet");
                return false;
            }
            Some(_) => {}
        }
        let Some(pending) = session.pending.take() else {
            return false;
        };

        let outcome = if params.denied {
            Err(AuthError::Denied)
        } else {
            match (params.token, params.verifier) {
                (_, None) => Err(AuthError::MalformedCallback(
                    "missing oauth_verifier".to_string(),
                )),
                (Some(token), Some(_))
                    if pending
                        .expected_token
                        .as_deref()
                        .is_some_and(|expected| expected != token) =>
                {
                    Err(AuthError::MalformedCallback(
                        "oauth_token does not match the pending request".to_string(),
                    ))
                }
                (_, Some(verifier)) => Ok(verifier),
            }
        };

        pending.resolve(outcome);
        true
    }

    /// Abandon the waiting handshake. Returns whether one was waiting.
    pub fn cancel_login(&self) -> bool {
        let mut session = self.lock();
        match session.pending.take() {
            Some(pending) => {
                info!("Login cancelled");
                if pending.tx.is_closed() {
                    // Nobody is left to finish the login
                    session.active_login = None;
                }
                pending.resolve(Err(AuthError::Cancelled));
                true
            }
            None => false,
        }
    }

    /// Show the provider's registration page. Session state is unchanged.
    pub fn signup(&self, surface: &dyn AuthorizationSurface) -> Result<()> {
        surface.present(&self.signup_url)?;
        Ok(())
    }

    /// End the session and forget the persisted credential.
    ///
    /// Also cancels a waiting handshake. Calling it while logged out is a
    /// no-op.
    pub fn logout(&self) -> Result<()> {
        let mut session = self.lock();
        if let Some(pending) = session.pending.take() {
            pending.resolve(Err(AuthError::Cancelled));
        }
        session.active_login = None;

        // Forget the stored copy first so a failure leaves the session intact
        self.stored.remove()?;
        let had_session = session.credential.take().is_some();
        if had_session {
            info!("Logged out");
        }
        Ok(())
    }
}

/// Clears the login slot for `id` if it is still active when dropped
struct LoginGuard<'a> {
    service: &'a AuthorizationService,
    id: u64,
}

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.service.lock();
        if session.active_login == Some(self.id) {
            debug!("Login abandoned before it finished");
            session.active_login = None;
            session.pending = None;
        }
    }
}

impl CredentialProvider for AuthorizationService {
    fn credential(&self) -> Option<Credential> {
        AuthorizationService::credential(self)
    }
}

/// Fixed credential, for tools that already hold an access token
impl CredentialProvider for Option<Credential> {
    fn credential(&self) -> Option<Credential> {
        self.clone()
    }
}
