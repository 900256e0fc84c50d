//! Skill Ranking Module
//! Counts skill usage per canonical role and selects the top skills.

use crate::data::{DataProcessor, MappedSurveyRecord, ProcessorError, Role};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Skill name used for the synthetic row of a role without usage.
pub const NO_SKILLS_PLACEHOLDER: &str = "No top skills reported";

/// Usage count of one skill within one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub role: Role,
    pub skill: String,
    pub count: u64,
}

impl SkillCount {
    fn placeholder(role: Role) -> Self {
        Self {
            role,
            skill: NO_SKILLS_PLACEHOLDER.to_string(),
            count: 0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.count == 0 && self.skill == NO_SKILLS_PLACEHOLDER
    }
}

/// Ranks skills per role from mapped survey records.
pub struct SkillRanker {
    top_n: usize,
}

impl SkillRanker {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Top skills per role, ordered by role then rank.
    ///
    /// Ties on count are broken by skill name so reports are reproducible.
    /// Roles present in `records` without any used skill get a single
    /// placeholder row.
    pub fn rank(
        &self,
        records: &[MappedSurveyRecord],
        skills: &[String],
    ) -> Result<Vec<SkillCount>, ProcessorError> {
        let long_df = DataProcessor::stack_skills_to_long(records, skills)?;
        let counts_df = DataProcessor::count_skill_usage(&long_df)?;

        let mut by_role: BTreeMap<Role, Vec<(String, u64)>> = BTreeMap::new();
        let roles = counts_df.column("role")?.str()?;
        let names = counts_df.column("skill")?.str()?;
        let counts = counts_df.column("count")?.i64()?;

        for ((role, skill), count) in roles.into_iter().zip(names).zip(counts) {
            let (Some(role), Some(skill), Some(count)) = (role, skill, count) else {
                continue;
            };
            let Some(role) = Role::from_title(role) else {
                continue;
            };
            if count > 0 {
                by_role
                    .entry(role)
                    .or_default()
                    .push((skill.to_string(), count as u64));
            }
        }

        let present: BTreeSet<Role> = records.iter().map(|r| r.mapped_role).collect();
        let mut ranked = Vec::new();

        for role in present {
            match by_role.remove(&role) {
                Some(mut entries) => {
                    entries.sort_by(rank_order);
                    entries.truncate(self.top_n);
                    debug!(role = %role, kept = entries.len(), "top skills selected");
                    ranked.extend(entries.into_iter().map(|(skill, count)| SkillCount {
                        role,
                        skill,
                        count,
                    }));
                }
                None => {
                    debug!(role = %role, "no skill usage, inserting placeholder");
                    ranked.push(SkillCount::placeholder(role));
                }
            }
        }

        Ok(ranked)
    }
}

/// Count descending, then skill name ascending.
fn rank_order(a: &(String, u64), b: &(String, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Group ranked rows by role, preserving rank order.
pub fn skills_by_role(skills: &[SkillCount]) -> BTreeMap<Role, Vec<&SkillCount>> {
    let mut grouped: BTreeMap<Role, Vec<&SkillCount>> = BTreeMap::new();
    for skill in skills {
        grouped.entry(skill.role).or_default().push(skill);
    }
    grouped
}

/// Convert ranked rows to a DataFrame for export.
///
/// Output columns: ["role", "rank", "skill", "count"]
pub fn skill_counts_frame(skills: &[SkillCount]) -> PolarsResult<DataFrame> {
    let mut ranks: Vec<u32> = Vec::with_capacity(skills.len());
    for group in skills_by_role(skills).values() {
        ranks.extend(1..=group.len() as u32);
    }

    // skills_by_role iterates in role order, which is also the order of `skills`.
    DataFrame::new(vec![
        Column::new(
            "role".into(),
            skills.iter().map(|s| s.role.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new("rank".into(), ranks),
        Column::new(
            "skill".into(),
            skills.iter().map(|s| s.skill.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            "count".into(),
            skills.iter().map(|s| s.count).collect::<Vec<u64>>(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SurveyRecord;

    fn respondent(role: Role, used: &[&str], all: &[&str]) -> MappedSurveyRecord {
        MappedSurveyRecord {
            record: SurveyRecord {
                current_role: role.as_str().to_string(),
                skill_flags: all
                    .iter()
                    .map(|s| (s.to_string(), used.contains(s)))
                    .collect(),
            },
            mapped_role: role,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    const ALL: [&str; 7] = ["python", "sql", "r_programming", "spark", "aws", "excel", "git"];

    #[test]
    fn test_top_n_limit_and_order() {
        let records = vec![
            respondent(Role::DataScientist, &["python", "sql", "spark", "aws", "excel", "git"], &ALL),
            respondent(Role::DataScientist, &["python", "sql", "r_programming"], &ALL),
            respondent(Role::DataScientist, &["python"], &ALL),
        ];
        let ranked = SkillRanker::new(5).rank(&records, &names(&ALL)).unwrap();

        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].skill, "python");
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[1].skill, "sql");
        assert_eq!(ranked[1].count, 2);
        // Remaining count-1 skills in alphabetical order: aws, excel, git, r_programming, spark
        let tail: Vec<&str> = ranked[2..].iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(tail, vec!["aws", "excel", "git"]);
    }

    #[test]
    fn test_placeholder_for_role_without_usage() {
        let records = vec![
            respondent(Role::DataScientist, &["python"], &ALL),
            respondent(Role::DataAnalyst, &[], &ALL),
        ];
        let ranked = SkillRanker::new(5).rank(&records, &names(&ALL)).unwrap();

        let analyst: Vec<&SkillCount> = ranked.iter().filter(|s| s.role == Role::DataAnalyst).collect();
        assert_eq!(analyst.len(), 1);
        assert!(analyst[0].is_placeholder());
        assert_eq!(analyst[0].skill, NO_SKILLS_PLACEHOLDER);
        assert!(ranked.iter().all(|s| s.role != Role::MachineLearningEngineer));
    }

    #[test]
    fn test_all_false_record_contributes_nothing() {
        let records = vec![
            respondent(Role::MachineLearningEngineer, &["pytorch_missing"], &ALL),
            respondent(Role::MachineLearningEngineer, &["git"], &ALL),
        ];
        let ranked = SkillRanker::new(5).rank(&records, &names(&ALL)).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].skill, "git");
        assert_eq!(ranked[0].count, 1);
    }

    #[test]
    fn test_only_considered_skills_counted() {
        let records = vec![respondent(Role::DataScientist, &["python", "sql"], &ALL)];
        let ranked = SkillRanker::new(5).rank(&records, &names(&["sql"])).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].skill, "sql");
    }

    #[test]
    fn test_skill_counts_frame_ranks_restart_per_role() {
        let records = vec![
            respondent(Role::DataScientist, &["python", "sql"], &ALL),
            respondent(Role::DataAnalyst, &["excel"], &ALL),
        ];
        let ranked = SkillRanker::new(5).rank(&records, &names(&ALL)).unwrap();
        let df = skill_counts_frame(&ranked).unwrap();
        let ranks: Vec<u32> = df
            .column("rank")
            .unwrap()
            .u32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(ranks, vec![1, 2, 1]);
    }
}
