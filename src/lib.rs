//! Query-composition core for salmon habitat regions and populations.
//!
//! Regions and conservation units are stored in two PostGIS tables with no
//! shared key but are presented identically to callers. Given a set of
//! optional filters (kind, name, code, species, subgroup, overlap geometry)
//! this crate validates the categorical values against live database
//! content, picks one of four join shapes, pushes every filter — including
//! the coordinate transform and the spatial intersects predicate — down to
//! PostGIS, and normalizes the heterogeneous row shapes into one canonical
//! record schema.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use salmon_occurrence::{DatabaseConfig, OccurrenceService, RegionParams};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = salmon_occurrence::connect(&DatabaseConfig::default()).await?;
//! let service = OccurrenceService::new(pool);
//! let watersheds = service
//!     .list_regions(&RegionParams {
//!         kind: "watershed".into(),
//!         species: Some("Sockeye".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod error;
pub mod models;
pub mod projection;
pub mod query;
pub mod service;
pub mod vocabulary;

pub use database::{connect, DatabaseConfig};
pub use error::{OccurrenceError, Result};
pub use models::{
    ConservationUnitSummary, PopulationRecord, RegionRecord, TaxonRecord,
};
pub use projection::{tag_as_public, TaggedGeometry, INTERNAL_SRID, PUBLIC_SRID};
pub use service::{OccurrenceService, PopulationParams, RegionParams};
pub use vocabulary::{
    validate_region_kind, validate_species, validate_subgroup, PgVocabulary, VocabularySource,
    CONSERVATION_UNIT_KIND,
};
