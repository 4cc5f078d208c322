//! Structural validation of generator output.
//!
//! Parsing goes through the typed [`InsightSet`] schema, so a missing field,
//! a wrong type or an unknown impact level is a [`InsightResponse::Malformed`]
//! rather than a partially trusted value.

use super::InsightSet;

/// Outcome of validating a generator response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightResponse {
    Valid(InsightSet),
    Malformed { reason: String },
}

impl InsightResponse {
    fn malformed(reason: impl Into<String>) -> Self {
        InsightResponse::Malformed {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, InsightResponse::Valid(_))
    }
}

/// Validate a raw response body. Tolerates a surrounding Markdown code fence.
pub fn validate_response(body: &str) -> InsightResponse {
    let body = strip_code_fence(body);

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return InsightResponse::malformed(format!("not JSON: {e}")),
    };
    if !value.is_object() {
        return InsightResponse::malformed("top-level value is not an object");
    }

    let set: InsightSet = match serde_json::from_value(value) {
        Ok(set) => set,
        Err(e) => return InsightResponse::malformed(e.to_string()),
    };

    if set.overall_score > 100 {
        return InsightResponse::malformed(format!(
            "overallScore {} is outside 0..=100",
            set.overall_score
        ));
    }
    if set.summary.trim().is_empty() {
        return InsightResponse::malformed("summary is empty");
    }

    InsightResponse::Valid(set)
}

fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::Impact;

    const VALID: &str = r#"{
        "insights": [
            {"title": "Protect your afternoon", "description": "Three hours are free after lunch.", "impact": "high"}
        ],
        "summary": "A balanced day.",
        "overallScore": 72,
        "riskFactors": ["Back-to-back morning"],
        "opportunities": ["Deep work after 14:00"],
        "predictiveAlerts": []
    }"#;

    #[test]
    fn test_valid_response() {
        match validate_response(VALID) {
            InsightResponse::Valid(set) => {
                assert_eq!(set.overall_score, 72);
                assert_eq!(set.insights[0].impact, Impact::High);
                assert!(set.predictive_alerts.is_empty());
            }
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn test_code_fenced_response() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(validate_response(&fenced).is_valid());
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            validate_response("Sure! Here are your insights."),
            InsightResponse::Malformed { .. }
        ));
    }

    #[test]
    fn test_array_top_level() {
        assert_eq!(
            validate_response("[]"),
            InsightResponse::Malformed {
                reason: "top-level value is not an object".into()
            }
        );
    }

    #[test]
    fn test_missing_field() {
        let body = VALID.replace(r#""predictiveAlerts": []"#, r#""extra": 1"#);
        assert!(!validate_response(&body).is_valid());
    }

    #[test]
    fn test_wrong_field_type() {
        let body = VALID.replace(
            r#""riskFactors": ["Back-to-back morning"]"#,
            r#""riskFactors": "many""#,
        );
        assert!(!validate_response(&body).is_valid());
    }

    #[test]
    fn test_unknown_impact() {
        let body = VALID.replace(r#""impact": "high""#, r#""impact": "critical""#);
        assert!(!validate_response(&body).is_valid());
    }

    #[test]
    fn test_score_out_of_range() {
        let body = VALID.replace(r#""overallScore": 72"#, r#""overallScore": 140"#);
        match validate_response(&body) {
            InsightResponse::Malformed { reason } => assert!(reason.contains("140")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_fractional_score_rejected() {
        let body = VALID.replace(r#""overallScore": 72"#, r#""overallScore": 72.5"#);
        assert!(!validate_response(&body).is_valid());
    }
}
