//! Registration notification.
//!
//! After a successful registration the portal posts a small JSON payload to
//! a configured webhook URL (the old contact-form relay). The caller spawns
//! the request as a task and awaits the handle, so a failure is surfaced
//! instead of silently swallowed.

use serde::Serialize;

/// Payload delivered to the notification webhook.
#[derive(Debug, Serialize)]
pub struct RegistrationNotice<'a> {
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
}

/// Deliver a registration notice.
///
/// # Errors
///
/// Returns the transport error, or an error for a non-2xx response.
pub async fn notify_registration(
    client: &reqwest::Client,
    url: &str,
    notice: &RegistrationNotice<'_>,
) -> Result<(), reqwest::Error> {
    client
        .post(url)
        .json(notice)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
