use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draft::Profile;
use crate::submission::ProfilePayload;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProfileOperation {
    FetchCurrent,
    Update(ProfilePayload),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProfileOutput {
    /// `None` when the session has no profile yet.
    Current(Option<Profile>),
    Updated,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile request rejected with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("profile service unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("profile service answered with a reply for another operation")]
    UnexpectedReply,
}

pub type ProfileResult = Result<ProfileOutput, ProfileError>;

impl Operation for ProfileOperation {
    type Output = ProfileResult;
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

impl ProfileError {
    /// Builds a rejection from an HTTP status and optional JSON body of the
    /// form `{"message": "..."}`.
    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .and_then(|e| e.message)
            .filter(|m| !m.trim().is_empty());

        Self::Rejected { status, message }
    }

    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            Self::Unreachable { .. } | Self::UnexpectedReply => None,
        }
    }

    /// Message to show the user, falling back when the server sent none.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Profile source and sink provided by the shell.
#[derive(Capability)]
pub struct ProfileStore<Ev> {
    context: CapabilityContext<ProfileOperation, Ev>,
}

impl<Ev> ProfileStore<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<ProfileOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn fetch_current<F>(&self, callback: F)
    where
        F: FnOnce(ProfileResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(ProfileOperation::FetchCurrent, callback);
    }

    pub fn update<F>(&self, payload: ProfilePayload, callback: F)
    where
        F: FnOnce(ProfileResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        self.request(ProfileOperation::Update(payload), callback);
    }

    fn request<F>(&self, operation: ProfileOperation, callback: F)
    where
        F: FnOnce(ProfileResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_reads_message() {
        let body = br#"{"message": "Age is invalid"}"#;
        let err = ProfileError::from_http_status(400, Some(body.as_slice()));
        assert_eq!(
            err,
            ProfileError::Rejected {
                status: 400,
                message: Some("Age is invalid".into()),
            }
        );
        assert_eq!(err.user_message("fallback"), "Age is invalid");
    }

    #[test]
    fn test_from_http_status_without_message() {
        let err = ProfileError::from_http_status(500, Some(b"<html>".as_slice()));
        assert_eq!(err.server_message(), None);
        assert_eq!(err.user_message("Failed to save details"), "Failed to save details");

        let err = ProfileError::from_http_status(502, None);
        assert_eq!(err.server_message(), None);

        let blank = br#"{"message": "  "}"#;
        let err = ProfileError::from_http_status(400, Some(blank.as_slice()));
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_unreachable_uses_fallback() {
        let err = ProfileError::Unreachable {
            reason: "dns".into(),
        };
        assert_eq!(err.user_message("Failed to save details"), "Failed to save details");
        assert_eq!(err.to_string(), "profile service unreachable: dns");
    }
}
