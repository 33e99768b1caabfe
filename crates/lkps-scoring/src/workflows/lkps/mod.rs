//! LKPS table scoring: per-table plugins, cross-table score lookups, and the service
//! that validates, scores and persists table saves.

pub mod config;
pub mod domain;
pub mod formulas;
pub mod plugin;
pub mod plugins;
pub mod registry;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::{CooperationWeights, ScoringConfig};
pub use domain::{
    FieldKind, FieldValue, ScoreDetail, ScoreEntry, ScoreOutcome, TableCode, TableRecord,
};
pub use formulas::{BlendFactors, ThresholdLinear};
pub use plugin::{ColumnSpec, ScoreContext, TablePlugin, TableSchema, ValidationRule};
pub use registry::{PluginRegistry, PluginSummary};
pub use repository::{PersistedScores, RepositoryError, SavedTable, ScoreRepository};
pub use resolver::{CachingResolver, ResolverError, ScoreDetailResolver, StaticResolver};
pub use router::{lkps_router, FieldUpdate};
pub use service::{
    ImportSummary, LkpsScoringService, SaveReport, ScoringServiceError, ValidationIssue,
};
pub use store::{StoreError, TableDataStore};
