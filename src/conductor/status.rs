//! Normalizes Elemental job documents into the canonical [`JobStatus`].

use serde_json::{Map, Value};

use crate::core::{JobStatus, Status};

use super::NAME;
use super::api::JobResponse;

/// Job states reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeStatus {
    Pending,
    Preprocessing,
    Running,
    Postprocessing,
    Complete,
    Cancelled,
    Error,
    Other,
}

impl NativeStatus {
    /// Case-insensitive; anything unrecognized is [`NativeStatus::Other`].
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "preprocessing" => Self::Preprocessing,
            "running" => Self::Running,
            "postprocessing" => Self::Postprocessing,
            "complete" => Self::Complete,
            "cancelled" => Self::Cancelled,
            "error" => Self::Error,
            _ => Self::Other,
        }
    }
}

impl From<NativeStatus> for Status {
    fn from(native: NativeStatus) -> Self {
        match native {
            NativeStatus::Pending => Status::Queued,
            NativeStatus::Preprocessing | NativeStatus::Running | NativeStatus::Postprocessing => {
                Status::Started
            }
            NativeStatus::Complete => Status::Finished,
            NativeStatus::Cancelled => Status::Canceled,
            NativeStatus::Error => Status::Failed,
            NativeStatus::Other => Status::Unknown,
        }
    }
}

pub fn canonical_status(native: &str) -> Status {
    NativeStatus::parse(native).into()
}

/// Diagnostic fields for `response`. Timestamps that never happened and an
/// empty error list are left out.
pub fn provider_status(response: &JobResponse) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        "pct_complete".into(),
        Value::String(response.pct_complete.to_string()),
    );
    fields.insert(
        "submitted".into(),
        response
            .submitted
            .map(|ts| Value::String(ts.to_rfc3339()))
            .unwrap_or(Value::Null),
    );

    let optional = [
        ("start_time", response.start_time),
        ("complete_time", response.complete_time),
        ("errored_time", response.errored_time),
    ];
    for (key, timestamp) in optional {
        if let Some(ts) = timestamp {
            fields.insert(key.into(), Value::String(ts.to_rfc3339()));
        }
    }

    if !response.error_messages.errors.is_empty() {
        let messages = response
            .error_messages
            .errors
            .iter()
            .map(|error| Value::String(error.message.clone()))
            .collect();
        fields.insert("error_messages".into(), Value::Array(messages));
    }

    fields
}

/// Translate a queried job. `job_id` is used when the response carries no id
/// of its own.
pub fn translate_status(job_id: &str, response: &JobResponse) -> JobStatus {
    JobStatus {
        provider_name: NAME.to_string(),
        provider_job_id: response.id().unwrap_or(job_id).to_string(),
        status: canonical_status(&response.status),
        provider_status: provider_status(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductor::api::{ErrorMessages, JobError};
    use chrono::DateTime;

    #[test]
    fn maps_every_native_status() {
        let cases = [
            ("pending", Status::Queued),
            ("preprocessing", Status::Started),
            ("running", Status::Started),
            ("postprocessing", Status::Started),
            ("complete", Status::Finished),
            ("cancelled", Status::Canceled),
            ("error", Status::Failed),
        ];
        for (native, expected) in cases {
            assert_eq!(canonical_status(native), expected, "{native}");
        }
    }

    #[test]
    fn mapping_is_case_insensitive_and_total() {
        assert_eq!(canonical_status("Running"), Status::Started);
        assert_eq!(canonical_status("COMPLETE"), Status::Finished);
        assert_eq!(canonical_status("PeNdInG"), Status::Queued);
        assert_eq!(canonical_status(""), Status::Unknown);
        assert_eq!(canonical_status("canceled"), Status::Unknown);
        assert_eq!(canonical_status("paused"), Status::Unknown);
    }

    #[test]
    fn zero_timestamps_are_omitted() {
        let response = JobResponse {
            href: "/jobs/7".into(),
            status: "pending".into(),
            pct_complete: 0,
            submitted: Some(DateTime::parse_from_rfc3339("2015-11-20T10:15:30-05:00").unwrap()),
            ..Default::default()
        };

        let fields = provider_status(&response);

        let mut keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["pct_complete", "submitted"]);
        assert_eq!(fields["pct_complete"], "0");
        assert_eq!(fields["submitted"], "2015-11-20T10:15:30-05:00");
    }

    #[test]
    fn reported_times_and_errors_are_included() {
        let ts = DateTime::parse_from_rfc3339("2015-11-20T10:20:00+00:00").unwrap();
        let response = JobResponse {
            href: "/jobs/8".into(),
            status: "error".into(),
            pct_complete: 37,
            submitted: Some(ts),
            start_time: Some(ts),
            errored_time: Some(ts),
            error_messages: ErrorMessages {
                errors: vec![JobError {
                    message: "input not found".into(),
                    ..Default::default()
                }],
            },
            ..Default::default()
        };

        let status = translate_status("8", &response);

        assert_eq!(status.provider_name, "elementalconductor");
        assert_eq!(status.provider_job_id, "8");
        assert_eq!(status.status, Status::Failed);
        assert_eq!(status.provider_status["pct_complete"], "37");
        assert!(status.provider_status.contains_key("start_time"));
        assert!(status.provider_status.contains_key("errored_time"));
        assert!(!status.provider_status.contains_key("complete_time"));
        assert_eq!(
            status.provider_status["error_messages"],
            serde_json::json!(["input not found"])
        );
    }

    #[test]
    fn falls_back_to_requested_id() {
        let response = JobResponse {
            status: "complete".into(),
            ..Default::default()
        };
        let status = translate_status("99", &response);
        assert_eq!(status.provider_job_id, "99");
        assert_eq!(status.status, Status::Finished);
    }
}
