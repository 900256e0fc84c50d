//! Data module - CSV loading, role mapping and aggregation

mod loader;
mod processor;
mod roles;

pub use loader::{
    DataLoader, DataSource, LoadAudit, LoaderError, SalaryRecord, SalaryTable, SurveyRecord,
    SurveyTable,
};
pub use processor::{DataProcessor, ProcessorError, SalaryYearRole};
pub use roles::{MappedSurveyRecord, MappingAudit, Role, RoleMapper};
