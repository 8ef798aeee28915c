use serde_json::json;

use super::ServiceError;
use crate::api::{ApiClient, RequestOptions};
use crate::config::{clear_token, store_token, SecureString};
use crate::session::{SessionPhase, SessionStore};

/// Minimum accepted one-time code length.
const MIN_OTP_LEN: usize = 4;

/// Validate a school email and return the account part the backend expects.
///
/// Matching is case-insensitive; `domain` includes the leading `@`.
pub fn account_name(email: &str, domain: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_ascii_lowercase();
    let domain = domain.trim().to_ascii_lowercase();
    let account = email
        .strip_suffix(&domain)
        .filter(|local| !local.is_empty() && !local.contains('@'))
        .ok_or_else(|| ServiceError::InvalidInput(format!("Email must end with {}", domain)))?;
    Ok(account.to_string())
}

/// OTP login and logout.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionStore,
    email_domain: String,
}

impl AuthService {
    pub fn new(api: ApiClient, session: SessionStore, email_domain: impl Into<String>) -> Self {
        Self {
            api,
            session,
            email_domain: email_domain.into(),
        }
    }

    /// Ask the backend to mail a one-time code.
    pub async fn request_otp(&self, email: &str) -> Result<(), ServiceError> {
        let account = account_name(email, &self.email_domain)?;
        self.api
            .post(
                "/auth/request-otp",
                json!({ "email": account }),
                RequestOptions::default(),
            )
            .await?;
        tracing::info!(account = %account, "OTP requested");
        Ok(())
    }

    /// Exchange a one-time code for an access token and store it.
    ///
    /// The session moves to `LoggingIn`; loading the user completes it.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<(), ServiceError> {
        let account = account_name(email, &self.email_domain)?;
        let code = code.trim();
        if code.len() < MIN_OTP_LEN {
            return Err(ServiceError::InvalidInput(
                "Please enter a valid OTP".to_string(),
            ));
        }

        let response = self
            .api
            .post(
                "/auth/verify-otp",
                json!({ "email": account, "otp_code": code }),
                RequestOptions::default(),
            )
            .await?;

        let token = response
            .get("access_token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("Invalid token".to_string()))?;

        store_token(self.api.storage().as_ref(), &SecureString::new(token.to_string()))?;
        if self.session.phase() == SessionPhase::LoggedOut {
            self.session.begin_login();
        }
        tracing::info!(account = %account, "OTP verified, token stored");
        Ok(())
    }

    /// Forget the token and reset the session.
    pub fn logout(&self) -> Result<(), ServiceError> {
        clear_token(self.api.storage().as_ref())?;
        self.session.logout();
        tracing::info!("Logged out");
        Ok(())
    }
}
