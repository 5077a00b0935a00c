//! Wire shapes exchanged between the caller, the relay and content logic.
//!
//! Success and failure are told apart only by the presence of an `error`
//! field in the response payload.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RelayError;
use crate::types::JobData;

/// Messages understood by the handlers, tagged by `action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Content-context request: extract from this page
    GetJobData,

    /// Caller-facing request, routed through the relay to the sender's tab
    RequestJobDataFromTab,
}

impl Message {
    /// Parse a raw payload; unknown actions yield `None` and are ignored.
    pub fn from_json(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }
}

/// Response payload: either job data or an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobDataResponse {
    // Listed first so payloads carrying `error` never parse as empty data
    Error { error: String },
    Data(JobData),
}

impl JobDataResponse {
    pub fn error(message: impl Into<String>) -> Self {
        JobDataResponse::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JobDataResponse::Error { .. })
    }

    pub fn into_result(self) -> Result<JobData, RelayError> {
        match self {
            JobDataResponse::Data(data) => Ok(data),
            JobDataResponse::Error { error } => Err(RelayError::Send(error)),
        }
    }
}

impl From<Result<JobData, RelayError>> for JobDataResponse {
    fn from(result: Result<JobData, RelayError>) -> Self {
        match result {
            Ok(data) => JobDataResponse::Data(data),
            Err(e) => JobDataResponse::error(e.to_string()),
        }
    }
}

/// Browser tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who sent a message. `tab` is absent for senders outside any tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageSender {
    pub tab: Option<TabId>,
}

impl MessageSender {
    pub fn tab(tab: TabId) -> Self {
        Self { tab: Some(tab) }
    }

    pub fn detached() -> Self {
        Self { tab: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PartialJobData;

    #[test]
    fn test_message_wire_format() {
        assert_eq!(
            serde_json::to_string(&Message::GetJobData).unwrap(),
            r#"{"action":"getJobData"}"#
        );
        assert_eq!(
            Message::from_json(r#"{"action":"requestJobDataFromTab"}"#),
            Some(Message::RequestJobDataFromTab)
        );
        assert_eq!(Message::from_json(r#"{"action":"openSidePanel"}"#), None);
    }

    #[test]
    fn test_error_payload_parses_as_error() {
        let response: JobDataResponse =
            serde_json::from_str(r#"{"error":"Tab ID is undefined"}"#).unwrap();

        assert!(response.is_error());
        assert_eq!(response, JobDataResponse::error("Tab ID is undefined"));
    }

    #[test]
    fn test_data_payload_round_trip_shape() {
        let response = JobDataResponse::Data(
            PartialJobData::new(Some("Acme"), Some("Engineer")).with_url("https://a.test/j"),
        );
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "companyName": "Acme",
                "jobPosition": "Engineer",
                "jobUrl": "https://a.test/j"
            })
        );
        assert!(!response.is_error());
    }

    #[test]
    fn test_empty_object_is_empty_data() {
        let response: JobDataResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response, JobDataResponse::Data(JobData::default()));
    }

    #[test]
    fn test_relay_error_becomes_error_field() {
        let response: JobDataResponse = Err(RelayError::TabIdUndefined).into();
        assert_eq!(response, JobDataResponse::error("Tab ID is undefined"));
    }
}
