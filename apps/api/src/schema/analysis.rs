use serde::{Deserialize, Serialize};

use super::{truncate_list, Schema, SchemaError, SchemaId};

pub const MAX_REQUIREMENTS: usize = 5;
pub const MAX_SKILLS: usize = 5;

/// Structured summary extracted from a raw job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionAnalysis {
    #[serde(rename = "description_summary")]
    pub summary: String,
    pub requirements: Vec<String>,
    #[serde(rename = "required_skills")]
    pub skills: Vec<String>,
}

impl JobDescriptionAnalysis {
    /// Caps both lists at five entries. The model is asked for "up to 5" and
    /// occasionally returns more.
    pub fn clamp(&mut self) {
        truncate_list(&mut self.requirements, MAX_REQUIREMENTS);
        truncate_list(&mut self.skills, MAX_SKILLS);
    }
}

impl Schema for JobDescriptionAnalysis {
    const ID: SchemaId = SchemaId::JobAnalysis;

    fn check(&self) -> Result<(), SchemaError> {
        if self.summary.trim().is_empty() {
            return Err(SchemaError::cross_field(
                Self::ID,
                "description_summary is empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate;
    use serde_json::json;

    #[test]
    fn test_analysis_uses_wire_field_names() {
        let analysis: JobDescriptionAnalysis = validate(json!({
            "description_summary": "Build APIs.",
            "requirements": ["Rust"],
            "required_skills": ["SQL", "Communication"]
        }))
        .unwrap();
        assert_eq!(analysis.summary, "Build APIs.");
        assert_eq!(analysis.skills.len(), 2);

        let out = serde_json::to_value(&analysis).unwrap();
        assert!(out.get("description_summary").is_some());
        assert!(out.get("required_skills").is_some());
    }

    #[test]
    fn test_clamp_caps_lists_at_five() {
        let mut analysis = JobDescriptionAnalysis {
            summary: "s".to_string(),
            requirements: (0..8).map(|i| format!("r{i}")).collect(),
            skills: (0..6).map(|i| format!("s{i}")).collect(),
        };
        analysis.clamp();
        assert_eq!(analysis.requirements.len(), 5);
        assert_eq!(analysis.skills, vec!["s0", "s1", "s2", "s3", "s4"]);
    }

    #[test]
    fn test_blank_summary_rejected() {
        let err = validate::<JobDescriptionAnalysis>(json!({
            "description_summary": "  ",
            "requirements": [],
            "required_skills": []
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::CrossField { .. }));
    }
}
