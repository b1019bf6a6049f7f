use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::questions::{QuestionKind, QuestionSet};
use super::{Schema, SchemaError, SchemaId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Verdict {
    /// Banding on the mean bullet score:
    /// ≥0.85 excellent, ≥0.65 good, ≥0.35 fair, otherwise poor.
    pub fn from_average(avg: f64) -> Self {
        if avg >= 0.85 {
            Verdict::Excellent
        } else if avg >= 0.65 {
            Verdict::Good
        } else if avg >= 0.35 {
            Verdict::Fair
        } else {
            Verdict::Poor
        }
    }

    pub fn needs_remediation(self) -> bool {
        matches!(self, Verdict::Fair | Verdict::Poor)
    }
}

/// How the model's self-reported verdict is treated after scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerdictPolicy {
    /// Keep whatever label the model produced.
    #[default]
    Trust,
    /// Reject the report if a label disagrees with the score banding.
    Validate,
    /// Overwrite every label with the banded value.
    Recompute,
}

impl FromStr for VerdictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trust" => Ok(VerdictPolicy::Trust),
            "validate" => Ok(VerdictPolicy::Validate),
            "recompute" => Ok(VerdictPolicy::Recompute),
            other => Err(format!(
                "unknown verdict policy '{other}' (expected trust, validate or recompute)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletEvaluation {
    pub criterion: String,
    /// Nominally 0, 0.5 or 1; any value in [0, 1] is accepted as partial credit.
    pub score: f64,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingReview {
    pub correctness: String,
    pub time_complexity: String,
    pub space_complexity: String,
    #[serde(default)]
    pub edge_cases: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub question_id: String,
    pub kind: QuestionKind,
    pub verdict: Verdict,
    pub bullet_evals: Vec<BulletEvaluation>,
    pub feedback: String,
    #[serde(default)]
    pub coding_review: Option<CodingReview>,
}

impl QuestionEvaluation {
    pub fn average_score(&self) -> f64 {
        if self.bullet_evals.is_empty() {
            return 0.0;
        }
        let total: f64 = self.bullet_evals.iter().map(|b| b.score).sum();
        total / self.bullet_evals.len() as f64
    }

    /// Mean bullet score on a 0–100 scale.
    pub fn percent(&self) -> f64 {
        self.average_score() * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub job_title: String,
    pub overall_summary: String,
    pub items: Vec<QuestionEvaluation>,
}

impl Schema for ScoreReport {
    const ID: SchemaId = SchemaId::ScoreReport;

    fn check(&self) -> Result<(), SchemaError> {
        for (i, item) in self.items.iter().enumerate() {
            if let Some(b) = item
                .bullet_evals
                .iter()
                .find(|b| !(0.0..=1.0).contains(&b.score))
            {
                return Err(SchemaError::TypeMismatch {
                    schema: Self::ID,
                    detail: format!("items[{i}] has score {} outside [0, 1]", b.score),
                });
            }

            let is_coding = item.kind == QuestionKind::Coding;
            if is_coding != item.coding_review.is_some() {
                return Err(SchemaError::cross_field(
                    Self::ID,
                    format!("items[{i}]: coding_review must be present iff kind is coding"),
                ));
            }
        }
        Ok(())
    }
}

impl ScoreReport {
    /// Cross-references the report against the set it grades: one item per
    /// question, same order, same kind, one bullet evaluation per rubric bullet.
    /// Criteria are rewritten to the rubric text so ordering is explicit.
    pub fn reconcile(&mut self, set: &QuestionSet) -> Result<(), SchemaError> {
        if self.items.len() != set.questions.len() {
            return Err(SchemaError::cardinality(
                Self::ID,
                format!(
                    "expected {} evaluations, got {}",
                    set.questions.len(),
                    self.items.len()
                ),
            ));
        }

        for (i, (item, question)) in self.items.iter_mut().zip(&set.questions).enumerate() {
            if item.question_id != question.id {
                let detail = if set.find(&item.question_id).is_some() {
                    format!(
                        "items[{i}] refers to '{}' but question '{}' is at that position",
                        item.question_id, question.id
                    )
                } else {
                    format!("items[{i}] refers to unknown question '{}'", item.question_id)
                };
                return Err(SchemaError::cross_field(Self::ID, detail));
            }

            if item.kind != question.kind {
                return Err(SchemaError::cross_field(
                    Self::ID,
                    format!("items[{i}] kind does not match question '{}'", question.id),
                ));
            }

            if item.bullet_evals.len() != question.rubric.len() {
                return Err(SchemaError::cardinality(
                    Self::ID,
                    format!(
                        "items[{i}] has {} bullet evaluations for a rubric of {}",
                        item.bullet_evals.len(),
                        question.rubric.len()
                    ),
                ));
            }

            for (eval, criterion) in item.bullet_evals.iter_mut().zip(&question.rubric) {
                eval.criterion.clone_from(criterion);
            }
        }

        Ok(())
    }

    pub fn apply_verdict_policy(&mut self, policy: VerdictPolicy) -> Result<(), SchemaError> {
        match policy {
            VerdictPolicy::Trust => Ok(()),
            VerdictPolicy::Validate => {
                for (i, item) in self.items.iter().enumerate() {
                    let banded = Verdict::from_average(item.average_score());
                    if item.verdict != banded {
                        return Err(SchemaError::cross_field(
                            Self::ID,
                            format!(
                                "items[{i}] verdict {:?} disagrees with average score {:.2} ({banded:?})",
                                item.verdict,
                                item.average_score()
                            ),
                        ));
                    }
                }
                Ok(())
            }
            VerdictPolicy::Recompute => {
                for item in &mut self.items {
                    item.verdict = Verdict::from_average(item.average_score());
                }
                Ok(())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::uniform_report;
    use super::*;
    use crate::schema::questions::fixtures::valid_set;

    #[test]
    fn test_verdict_banding() {
        assert_eq!(Verdict::from_average(1.0), Verdict::Excellent);
        assert_eq!(Verdict::from_average(0.85), Verdict::Excellent);
        assert_eq!(Verdict::from_average(0.84), Verdict::Good);
        assert_eq!(Verdict::from_average(0.65), Verdict::Good);
        assert_eq!(Verdict::from_average(0.5), Verdict::Fair);
        assert_eq!(Verdict::from_average(0.35), Verdict::Fair);
        assert_eq!(Verdict::from_average(0.34), Verdict::Poor);
        assert_eq!(Verdict::from_average(0.0), Verdict::Poor);
    }

    #[test]
    fn test_verdict_policy_parse() {
        assert_eq!("trust".parse::<VerdictPolicy>(), Ok(VerdictPolicy::Trust));
        assert_eq!(" Recompute ".parse::<VerdictPolicy>(), Ok(VerdictPolicy::Recompute));
        assert!("strict".parse::<VerdictPolicy>().is_err());
    }

    #[test]
    fn test_reconcile_rewrites_criteria_in_rubric_order() {
        let set = valid_set();
        let mut report = uniform_report(&set, 0.0, Verdict::Poor);
        report.reconcile(&set).unwrap();
        for (item, q) in report.items.iter().zip(&set.questions) {
            let criteria: Vec<_> = item.bullet_evals.iter().map(|b| b.criterion.clone()).collect();
            assert_eq!(criteria, q.rubric);
        }
    }

    #[test]
    fn test_reconcile_rejects_missing_item() {
        let set = valid_set();
        let mut report = uniform_report(&set, 1.0, Verdict::Excellent);
        report.items.pop();
        assert!(matches!(report.reconcile(&set), Err(SchemaError::Cardinality { .. })));
    }

    #[test]
    fn test_reconcile_rejects_reordered_items() {
        let set = valid_set();
        let mut report = uniform_report(&set, 1.0, Verdict::Excellent);
        report.items.swap(3, 4);
        let err = report.reconcile(&set).unwrap_err();
        assert!(err.to_string().contains("at that position"), "{err}");
    }

    #[test]
    fn test_reconcile_rejects_unknown_id() {
        let set = valid_set();
        let mut report = uniform_report(&set, 1.0, Verdict::Excellent);
        report.items[0].question_id = "nope".to_string();
        let err = report.reconcile(&set).unwrap_err();
        assert!(err.to_string().contains("unknown question"), "{err}");
    }

    #[test]
    fn test_reconcile_rejects_bullet_count_mismatch() {
        let set = valid_set();
        let mut report = uniform_report(&set, 1.0, Verdict::Excellent);
        report.items[5].bullet_evals.pop();
        assert!(matches!(report.reconcile(&set), Err(SchemaError::Cardinality { .. })));
    }

    #[test]
    fn test_check_rejects_out_of_range_score() {
        let set = valid_set();
        let mut report = uniform_report(&set, 0.5, Verdict::Fair);
        report.items[2].bullet_evals[0].score = 1.5;
        assert!(matches!(report.check(), Err(SchemaError::TypeMismatch { .. })));
    }

    #[test]
    fn test_check_requires_coding_review_iff_coding() {
        let set = valid_set();
        let mut report = uniform_report(&set, 0.5, Verdict::Fair);
        report.items[0].coding_review = None;
        assert!(matches!(report.check(), Err(SchemaError::CrossField { .. })));

        let mut report = uniform_report(&set, 0.5, Verdict::Fair);
        report.items[7].coding_review = report.items[0].coding_review.clone();
        assert!(matches!(report.check(), Err(SchemaError::CrossField { .. })));
    }

    #[test]
    fn test_percent_is_mean_score() {
        let set = valid_set();
        let report = uniform_report(&set, 0.5, Verdict::Fair);
        assert!((report.items[0].percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_verdict_policies() {
        let set = valid_set();

        let mut trusted = uniform_report(&set, 0.0, Verdict::Excellent);
        trusted.apply_verdict_policy(VerdictPolicy::Trust).unwrap();
        assert!(trusted.items.iter().all(|i| i.verdict == Verdict::Excellent));

        let mut validated = uniform_report(&set, 0.0, Verdict::Excellent);
        assert!(validated.apply_verdict_policy(VerdictPolicy::Validate).is_err());
        let mut consistent = uniform_report(&set, 0.0, Verdict::Poor);
        assert!(consistent.apply_verdict_policy(VerdictPolicy::Validate).is_ok());

        let mut recomputed = uniform_report(&set, 0.0, Verdict::Excellent);
        recomputed.apply_verdict_policy(VerdictPolicy::Recompute).unwrap();
        assert!(recomputed.items.iter().all(|i| i.verdict == Verdict::Poor));
    }
}
