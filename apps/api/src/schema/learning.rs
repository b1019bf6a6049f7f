use serde::{Deserialize, Serialize};

use super::{truncate_list, Schema, SchemaError, SchemaId};

pub const MIN_TOPICS: usize = 3;
pub const MAX_TOPICS: usize = 5;
pub const MAX_QUICK_WINS: usize = 5;
pub const MIN_RESOURCES_PER_TOPIC: usize = 1;
pub const MAX_RESOURCES_PER_TOPIC: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillArea {
    DataStructuresAlgorithms,
    SystemDesign,
    Behavioral,
    DomainKnowledge,
    Communication,
    Tooling,
}

/// Declared in impact order so sorting ascending puts `High` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Article,
    Video,
    Course,
    Book,
    Documentation,
    Practice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    pub title: String,
    pub kind: ResourceKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub est_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPlan {
    pub topic: String,
    pub skill_area: SkillArea,
    pub why: String,
    pub priority: Priority,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub practice_tasks: Vec<String>,
    #[serde(default)]
    pub resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyBlock {
    pub label: String,
    pub focus: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub job_title: String,
    pub overview: String,
    #[serde(default)]
    pub quick_wins: Vec<String>,
    pub topics: Vec<TopicPlan>,
    #[serde(default)]
    pub study_schedule: Vec<StudyBlock>,
}

impl Schema for RecommendationReport {
    const ID: SchemaId = SchemaId::RecommendationReport;

    /// Only lower bounds are checked here; upper bounds are clamped by
    /// [`RecommendationReport::clamp`] since surplus output can be dropped.
    fn check(&self) -> Result<(), SchemaError> {
        if self.topics.len() < MIN_TOPICS {
            return Err(SchemaError::cardinality(
                Self::ID,
                format!(
                    "expected at least {MIN_TOPICS} topics, got {}",
                    self.topics.len()
                ),
            ));
        }
        if let Some(pos) = self.topics.iter().position(|t| t.why.trim().is_empty()) {
            return Err(SchemaError::MissingField {
                schema: Self::ID,
                detail: format!("topics[{pos}].why is empty"),
            });
        }
        if let Some(pos) = self
            .topics
            .iter()
            .position(|t| t.resources.len() < MIN_RESOURCES_PER_TOPIC)
        {
            return Err(SchemaError::cardinality(
                Self::ID,
                format!("topics[{pos}] has no resources, expected at least {MIN_RESOURCES_PER_TOPIC}"),
            ));
        }
        Ok(())
    }
}

impl RecommendationReport {
    /// Sorts topics by priority (stable), then applies every upper bound:
    /// topics, quick wins, resources per topic, total resources and the
    /// schedule's hour budget.
    ///
    /// Every kept topic keeps its first resource. When `max_resources` cannot
    /// cover one per topic, the lowest-priority topics are dropped (never
    /// below [`MIN_TOPICS`]). The rest of the allowance goes to topics in
    /// priority order.
    pub fn clamp(&mut self, max_resources: usize, budget_hours: f64) {
        self.topics.sort_by_key(|t| t.priority);
        truncate_list(&mut self.topics, MAX_TOPICS.min(max_resources.max(MIN_TOPICS)));
        truncate_list(&mut self.quick_wins, MAX_QUICK_WINS);

        let mut spare = max_resources.saturating_sub(self.topics.len());
        for topic in &mut self.topics {
            let available = topic.resources.len().min(MAX_RESOURCES_PER_TOPIC);
            let extra = available.saturating_sub(MIN_RESOURCES_PER_TOPIC).min(spare);
            spare -= extra;
            truncate_list(&mut topic.resources, MIN_RESOURCES_PER_TOPIC + extra);
        }

        let mut hours_left = budget_hours.max(0.0);
        self.study_schedule.retain_mut(|block| {
            if hours_left <= 0.0 || block.hours <= 0.0 {
                return false;
            }
            block.hours = block.hours.min(hours_left);
            hours_left -= block.hours;
            true
        });
    }

    pub fn resource_count(&self) -> usize {
        self.topics.iter().map(|t| t.resources.len()).sum()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_fewer_than_three_topics_rejected() {
        let r = report(vec![topic("a", Priority::High, 1), topic("b", Priority::Low, 1)]);
        assert!(matches!(r.check(), Err(SchemaError::Cardinality { .. })));
    }

    #[test]
    fn test_blank_why_rejected() {
        let mut r = report(vec![
            topic("a", Priority::High, 1),
            topic("b", Priority::Low, 1),
            topic("c", Priority::Low, 1),
        ]);
        r.topics[1].why = " ".to_string();
        assert!(matches!(r.check(), Err(SchemaError::MissingField { .. })));
    }

    #[test]
    fn test_topic_without_resources_rejected() {
        let r = report(vec![
            topic("a", Priority::High, 2),
            topic("b", Priority::Medium, 0),
            topic("c", Priority::Low, 1),
        ]);
        let err = r.check().unwrap_err();
        assert!(matches!(err, SchemaError::Cardinality { .. }));
        assert!(err.to_string().contains("topics[1]"), "{err}");
    }

    #[test]
    fn test_clamp_keeps_highest_priority_topics() {
        let mut r = report(vec![
            topic("low1", Priority::Low, 1),
            topic("high1", Priority::High, 1),
            topic("med1", Priority::Medium, 1),
            topic("low2", Priority::Low, 1),
            topic("high2", Priority::High, 1),
            topic("med2", Priority::Medium, 1),
            topic("low3", Priority::Low, 1),
        ]);
        r.clamp(100, 100.0);
        let names: Vec<_> = r.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(names, vec!["high1", "high2", "med1", "med2", "low1"]);
    }

    #[test]
    fn test_clamp_quick_wins() {
        let mut r = report(vec![
            topic("a", Priority::High, 1),
            topic("b", Priority::High, 1),
            topic("c", Priority::High, 1),
        ]);
        r.quick_wins = (0..9).map(|i| format!("win {i}")).collect();
        r.clamp(10, 10.0);
        assert_eq!(r.quick_wins.len(), MAX_QUICK_WINS);
    }

    #[test]
    fn test_clamp_resources_per_topic_and_total() {
        let mut r = report(vec![
            topic("a", Priority::High, 5),
            topic("b", Priority::High, 2),
            topic("c", Priority::Medium, 3),
        ]);
        r.clamp(10, 10.0);
        assert_eq!(
            r.topics.iter().map(|t| t.resources.len()).collect::<Vec<_>>(),
            vec![3, 2, 3]
        );

        let mut r = report(vec![
            topic("a", Priority::High, 3),
            topic("b", Priority::High, 3),
            topic("c", Priority::Medium, 3),
        ]);
        r.clamp(4, 10.0);
        assert_eq!(
            r.topics.iter().map(|t| t.resources.len()).collect::<Vec<_>>(),
            vec![2, 1, 1]
        );
    }

    #[test]
    fn test_clamp_drops_topics_the_allowance_cannot_cover() {
        let mut r = report(vec![
            topic("low", Priority::Low, 2),
            topic("high1", Priority::High, 2),
            topic("med", Priority::Medium, 2),
            topic("high2", Priority::High, 2),
            topic("med2", Priority::Medium, 2),
        ]);
        r.clamp(4, 10.0);
        let names: Vec<_> = r.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(names, vec!["high1", "high2", "med", "med2"]);
        assert!(r.topics.iter().all(|t| t.resources.len() == 1));
    }

    #[test]
    fn test_clamp_schedule_to_budget() {
        let mut r = report(vec![
            topic("a", Priority::High, 1),
            topic("b", Priority::High, 1),
            topic("c", Priority::High, 1),
        ]);
        r.clamp(10, 6.0);
        assert_eq!(r.study_schedule.len(), 2);
        assert!((r.study_schedule[1].hours - 2.0).abs() < f64::EPSILON);

        let mut r = report(vec![
            topic("a", Priority::High, 1),
            topic("b", Priority::High, 1),
            topic("c", Priority::High, 1),
        ]);
        r.clamp(10, 3.0);
        assert_eq!(r.study_schedule.len(), 1);
        let total: f64 = r.study_schedule.iter().map(|b| b.hours).sum();
        assert!(total <= 3.0);
    }
}
