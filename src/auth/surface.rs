//! Where the user meets the provider's web pages

use crate::error::AuthError;

/// A place to show the provider's authorization or sign-up page.
///
/// `present` must return promptly; the user's answer comes back later as a
/// redirect routed through
/// [`AuthorizationService::handle_callback`](super::AuthorizationService::handle_callback),
/// or as [`cancel_login`](super::AuthorizationService::cancel_login) when
/// the surface is closed without one.
pub trait AuthorizationSurface: Send + Sync {
    fn present(&self, url: &str) -> Result<(), AuthError>;

    /// Close the surface once the handshake has resolved
    fn dismiss(&self) {}
}
