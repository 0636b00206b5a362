//! Newsletter signup.

use tracing::instrument;

use super::{SUBSCRIBE_FAILED, settle};
use crate::api::{ApiClient, ApiResponse};

/// Shown after a successful signup.
pub const SUBSCRIBED: &str = "Successfully subscribed to newsletter!";

/// Subscribe `email` to the newsletter.
///
/// A successful signup always reports [`SUBSCRIBED`]; a rejection keeps the
/// backend's message.
#[instrument(skip(api))]
pub async fn subscribe(api: &ApiClient, email: &str) -> ApiResponse {
    let mut response = settle(api.subscribe_newsletter(email).await, SUBSCRIBE_FAILED);
    if response.success {
        response.message = Some(SUBSCRIBED.to_string());
    } else if response.message.is_none() {
        response.message = Some(SUBSCRIBE_FAILED.to_string());
    }
    response
}
