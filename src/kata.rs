use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KataSummary {
    pub id: String,
    pub sequence: u32,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseGroup {
    pub phase: u32,
    pub title: String,
    pub katas: Vec<KataSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KataListResponse {
    pub phases: Vec<PhaseGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KataDetail {
    pub id: String,
    pub title: String,
    pub description: String,
    pub broken_code: String,
    pub correct_code: String,
    pub explanation: String,
    pub compiler_error_interpretation: String,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub phase: Option<u32>,
    #[serde(default)]
    pub phase_title: Option<String>,
    #[serde(default)]
    pub sequence: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Shape a failed run request like a normal result so the output pane
    /// has a single rendering path.
    pub fn from_failure(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            success: false,
            execution_time_ms: 0,
            error: Some(message.into()),
        }
    }
}

/// Phase number containing kata `id`, if the list knows it.
pub fn phase_of(phases: &[PhaseGroup], id: &str) -> Option<u32> {
    phases
        .iter()
        .find(|group| group.katas.iter().any(|k| k.id == id))
        .map(|group| group.phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_without_hints_defaults_empty() {
        let json = r#"{
            "id": "k1",
            "title": "Borrowing",
            "description": "d",
            "broken_code": "fn main() {}",
            "correct_code": "fn main() {}",
            "explanation": "e",
            "compiler_error_interpretation": "c"
        }"#;
        let detail: KataDetail = serde_json::from_str(json).unwrap();
        assert!(detail.hints.is_empty());
        assert_eq!(detail.phase, None);
    }

    #[test]
    fn test_execution_result_error_field_optional() {
        let json = r#"{"stdout":"6","stderr":"","success":true,"execution_time_ms":12}"#;
        let result: ExecutionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.stdout, "6");
        assert!(result.error.is_none());
        assert!(!serde_json::to_string(&result).unwrap().contains("error"));
    }

    #[test]
    fn test_from_failure_shape() {
        let result = ExecutionResult::from_failure("connection refused");
        assert!(!result.success);
        assert_eq!(result.stdout, "");
        assert_eq!(result.execution_time_ms, 0);
        assert_eq!(result.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_phase_of() {
        let phases = vec![
            PhaseGroup {
                phase: 1,
                title: "Ownership".into(),
                katas: vec![KataSummary {
                    id: "a".into(),
                    sequence: 1,
                    title: "A".into(),
                }],
            },
            PhaseGroup {
                phase: 3,
                title: "Traits".into(),
                katas: vec![KataSummary {
                    id: "b".into(),
                    sequence: 1,
                    title: "B".into(),
                }],
            },
        ];
        assert_eq!(phase_of(&phases, "b"), Some(3));
        assert_eq!(phase_of(&phases, "zzz"), None);
    }
}
