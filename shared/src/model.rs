use crate::config::FormConfig;
use crate::form::FormState;
use crate::submission::SubmissionGate;

/// State of one form session. Dropped when the shell navigates away.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub config: FormConfig,
    pub form: FormState,
    pub submission: SubmissionGate,
    pub profile_requested: bool,
}

impl Model {
    #[must_use]
    pub fn with_config(config: FormConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.submission.status().error_message()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submission.status().is_in_flight()
    }
}
