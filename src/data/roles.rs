//! Role Mapper Module
//! Maps raw survey role labels onto the canonical target roles.

use crate::data::loader::SurveyRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Canonical target role shared by the salary and skill analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Machine Learning Engineer")]
    MachineLearningEngineer,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
}

impl Role {
    /// All canonical roles in report order.
    pub const ALL: [Role; 3] = [
        Role::DataScientist,
        Role::MachineLearningEngineer,
        Role::DataAnalyst,
    ];

    /// Job title as it appears in the salary dataset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::DataScientist => "Data Scientist",
            Role::MachineLearningEngineer => "Machine Learning Engineer",
            Role::DataAnalyst => "Data Analyst",
        }
    }

    /// Lowercase identifier used in output file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Role::DataScientist => "data_scientist",
            Role::MachineLearningEngineer => "machine_learning_engineer",
            Role::DataAnalyst => "data_analyst",
        }
    }

    /// Parse a canonical job title (exact match).
    pub fn from_title(title: &str) -> Option<Role> {
        Self::ALL.into_iter().find(|role| role.as_str() == title)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Survey record tagged with its canonical role.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedSurveyRecord {
    pub record: SurveyRecord,
    pub mapped_role: Role,
}

/// Counts of survey rows kept and dropped during mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingAudit {
    pub mapped: usize,
    pub unmapped: usize,
    /// Dropped rows per raw label.
    pub unmapped_labels: BTreeMap<String, usize>,
}

/// Exact-match lookup from raw survey labels to canonical roles.
///
/// The table is plain data (usually loaded from the `[roles]` section of the
/// report config) so new survey taxonomies only need a config change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleMapper {
    table: BTreeMap<String, Role>,
}

impl RoleMapper {
    pub fn new(table: BTreeMap<String, Role>) -> Self {
        Self { table }
    }

    /// Look up a raw label. `None` means the row is dropped.
    pub fn map_label(&self, label: &str) -> Option<Role> {
        self.table.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Canonical roles reachable through this table.
    pub fn target_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.table.values().copied().collect();
        roles.sort();
        roles.dedup();
        roles
    }

    /// Map every record, dropping those whose label has no entry.
    pub fn map_records(&self, records: &[SurveyRecord]) -> (Vec<MappedSurveyRecord>, MappingAudit) {
        let mut audit = MappingAudit::default();
        let mut mapped = Vec::with_capacity(records.len());

        for record in records {
            match self.map_label(&record.current_role) {
                Some(role) => {
                    audit.mapped += 1;
                    mapped.push(MappedSurveyRecord {
                        record: record.clone(),
                        mapped_role: role,
                    });
                }
                None => {
                    audit.unmapped += 1;
                    *audit
                        .unmapped_labels
                        .entry(record.current_role.clone())
                        .or_default() += 1;
                }
            }
        }

        if audit.unmapped > 0 {
            warn!(
                dropped = audit.unmapped,
                labels = audit.unmapped_labels.len(),
                "survey rows with unmapped roles dropped"
            );
        }
        debug!(mapped = audit.mapped, "survey roles mapped");

        (mapped, audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: &str) -> SurveyRecord {
        SurveyRecord {
            current_role: role.to_string(),
            skill_flags: BTreeMap::new(),
        }
    }

    fn mapper() -> RoleMapper {
        RoleMapper::new(BTreeMap::from([
            ("Data Scientist".to_string(), Role::DataScientist),
            ("ML Engineer".to_string(), Role::MachineLearningEngineer),
            ("Machine Learning Engineer".to_string(), Role::MachineLearningEngineer),
            ("Data Analyst".to_string(), Role::DataAnalyst),
        ]))
    }

    #[test]
    fn test_map_label_exact_match_only() {
        let mapper = mapper();
        assert_eq!(mapper.map_label("ML Engineer"), Some(Role::MachineLearningEngineer));
        assert_eq!(mapper.map_label("ml engineer"), None);
        assert_eq!(mapper.map_label("Data Scientist "), None);
    }

    #[test]
    fn test_map_records_drops_unmapped() {
        let records = vec![
            record("Data Scientist"),
            record("Student"),
            record("Data Analyst"),
            record("Student"),
            record("Manager"),
        ];
        let (mapped, audit) = mapper().map_records(&records);

        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].mapped_role, Role::DataScientist);
        assert_eq!(mapped[1].mapped_role, Role::DataAnalyst);
        assert_eq!(audit.mapped, 2);
        assert_eq!(audit.unmapped, 3);
        assert_eq!(audit.unmapped_labels.get("Student"), Some(&2));
        assert_eq!(audit.unmapped_labels.get("Manager"), Some(&1));
    }

    #[test]
    fn test_target_roles_deduplicated() {
        assert_eq!(mapper().target_roles(), Role::ALL.to_vec());
    }

    #[test]
    fn test_role_titles_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_title(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_title("Data Engineer"), None);
    }
}
