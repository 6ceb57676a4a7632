//! Fire-and-forget feedback submission.
//!
//! The network call lives behind `FeedbackTransport`; failures are logged
//! and reported as `false`, never propagated into game flow.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::GameConfig;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    pub question_id: String,
    pub question: String,
    pub answer: String,
    pub level: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("feedback endpoint is not configured")]
    MissingEndpoint,
    #[error("feedback endpoint {0:?} is not an http(s) URL")]
    InvalidEndpoint(String),
    #[error("failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport failed: {0}")]
    Transport(String),
}

pub trait FeedbackTransport {
    fn post(&self, endpoint: &str, body: &str) -> Result<(), FeedbackError>;
}

pub struct FeedbackClient {
    endpoint: Option<String>,
    transport: Box<dyn FeedbackTransport>,
}

impl FeedbackClient {
    pub fn new(endpoint: Option<String>, transport: Box<dyn FeedbackTransport>) -> Self {
        Self { endpoint, transport }
    }

    pub fn from_config(config: &GameConfig, transport: Box<dyn FeedbackTransport>) -> Self {
        Self::new(config.feedback_endpoint.clone(), transport)
    }

    fn endpoint(&self) -> Result<&str, FeedbackError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(FeedbackError::MissingEndpoint)?;
        let rest = endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(endpoint),
            _ => Err(FeedbackError::InvalidEndpoint(endpoint.to_string())),
        }
    }

    pub fn try_submit(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        let endpoint = self.endpoint()?;
        let body = serde_json::to_string(submission)?;
        self.transport.post(endpoint, &body)
    }

    pub fn submit(&self, submission: &FeedbackSubmission) -> bool {
        match self.try_submit(submission) {
            Ok(()) => true,
            Err(err) => {
                warn!(question = %submission.question_id, error = %err, "feedback not sent");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct Recorder {
        sent: Rc<RefCell<Vec<(String, String)>>>,
        fail: bool,
    }

    impl FeedbackTransport for Recorder {
        fn post(&self, endpoint: &str, body: &str) -> Result<(), FeedbackError> {
            if self.fail {
                return Err(FeedbackError::Transport("503".into()));
            }
            self.sent.borrow_mut().push((endpoint.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn submission() -> FeedbackSubmission {
        FeedbackSubmission {
            question_id: "q1".into(),
            question: "Fun?".into(),
            answer: "yes".into(),
            level: 3,
        }
    }

    #[test]
    fn test_submit_posts_camel_case_body() {
        let recorder = Recorder::default();
        let client = FeedbackClient::new(Some("https://example.test/fb".into()), Box::new(recorder.clone()));
        assert!(client.submit(&submission()));
        let sent = recorder.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://example.test/fb");
        assert_eq!(
            sent[0].1,
            r#"{"questionId":"q1","question":"Fun?","answer":"yes","level":3}"#
        );
    }

    #[test]
    fn test_bad_endpoints_fail_quietly() {
        for endpoint in [None, Some(""), Some("   "), Some("ftp://x"), Some("https://")] {
            let recorder = Recorder::default();
            let client = FeedbackClient::new(endpoint.map(String::from), Box::new(recorder.clone()));
            assert!(!client.submit(&submission()), "{endpoint:?}");
            assert!(recorder.sent.borrow().is_empty());
        }
    }

    #[test]
    fn test_transport_failure_is_false() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let client = FeedbackClient::new(Some("http://localhost:9/fb".into()), Box::new(recorder));
        assert!(matches!(
            client.try_submit(&submission()),
            Err(FeedbackError::Transport(_))
        ));
        assert!(!client.submit(&submission()));
    }
}
