//! Boundary to the CAPTCHA-solving service.

use std::future::Future;

use crate::CaptchaError;

/// Produces a solved challenge-response token for one portal.
///
/// An implementation is bound to a single site key and page URL, so each
/// portal client owns its own solver.
pub trait CaptchaSolver: Send + Sync {
    fn solve(&self) -> impl Future<Output = Result<String, CaptchaError>> + Send;
}
