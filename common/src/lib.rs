//! IntegraCAR Common Library
//!
//! Motor puro de normalização e classificação, usado pela CLI:
//! detecção de colunas, canonicalização de entidades, classificação de
//! status e cálculo de prazo.

pub mod aggregate;
pub mod canonical;
pub mod columns;
pub mod config;
pub mod error;
pub mod export;
pub mod fuzzy;
pub mod geo;
pub mod pipeline;
pub mod reference;
pub mod sla;
pub mod status;
pub mod text;
pub mod types;

pub use aggregate::{GroupCount, PivotRow, PivotTable};
pub use canonical::{CanonicalCache, Canonicalizer, EntityKind, MatchSource, Resolution};
pub use columns::{detect_columns, ColumnRoleMap, Role, COLLISION_POLICY};
pub use config::{EngineConfig, FuzzyConfig, DEFAULT_DEADLINE_DAYS};
pub use error::{Error, Result};
pub use pipeline::{DashboardState, DashboardView, Dimension, Engine, RecordFilter};
pub use reference::ReferenceData;
pub use sla::{SlaOutcome, SlaSummary};
pub use status::{classify, Polarity, StatusClass};
pub use text::normalize;
pub use types::{NormalizedRecord, ProcessRecord, RawRecord};
