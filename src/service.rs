//! The operations exposed to the routing layer: region listing, population
//! listing, and the trivial taxon passthrough.
//!
//! Control flow per call: tag any overlap geometry, validate categorical
//! filters against live vocabulary, compose one of the fixed join shapes,
//! execute, normalize. Every failure path returns before or propagates out
//! of a single pool checkout; nothing is cached across calls and nothing is
//! retried.

use sqlx::PgPool;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    to_population_records, to_region_records, PopulationRecord, RegionRecord, TaxonRecord,
};
use crate::projection::tag_as_public;
use crate::query::{build_population_query, build_region_query, PopulationFilters, RegionFilters};
use crate::vocabulary::{
    title_case, validate_region_kind, validate_species, validate_subgroup, PgVocabulary,
};

/// Caller-supplied region filters, unvalidated. Only `kind` is required.
#[derive(Debug, Clone, Default)]
pub struct RegionParams {
    pub kind: String,
    /// WKT literal in the public reference system, POINT or POLYGON.
    pub overlap: Option<String>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub species: Option<String>,
    pub subgroup: Option<String>,
}

/// Caller-supplied population filters, unvalidated. `name` targets the
/// enclosing conservation unit.
#[derive(Debug, Clone, Default)]
pub struct PopulationParams {
    pub overlap: Option<String>,
    pub species: Option<String>,
    pub scientific_name: Option<String>,
    pub subgroup: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct OccurrenceService {
    pool: PgPool,
    vocabulary: PgVocabulary,
}

impl OccurrenceService {
    pub fn new(pool: PgPool) -> Self {
        let vocabulary = PgVocabulary::new(pool.clone());
        Self { pool, vocabulary }
    }

    /// List regions (or conservation units) matching the given filters.
    ///
    /// `kind` selects the table: the literal `conservation_unit` reads the
    /// conservation-unit table, anything else must be a kind currently
    /// present in the regions table. A species filter switches to the
    /// taxon-joined shape, deduplicated per region.
    pub async fn list_regions(&self, params: &RegionParams) -> Result<Vec<RegionRecord>> {
        let overlap = params.overlap.as_deref().map(tag_as_public).transpose()?;

        let kind = validate_region_kind(&self.vocabulary, &params.kind).await?;
        let species = match params.species.as_deref() {
            Some(s) => Some(validate_species(&self.vocabulary, s).await?),
            None => None,
        };
        let subgroup = match (species.as_deref(), params.subgroup.as_deref()) {
            (Some(species), Some(sg)) => {
                Some(validate_subgroup(&self.vocabulary, species, sg).await?)
            }
            _ => None,
        };

        debug!(%kind, species = ?species, subgroup = ?subgroup, "listing regions");

        let filters = RegionFilters {
            kind: &kind,
            overlap: overlap.as_ref(),
            name: params.name.as_deref(),
            code: params.code.as_deref(),
            species: species.as_deref(),
            subgroup: subgroup.as_deref(),
        };

        let mut query = build_region_query(&filters);
        let rows = query
            .build_query_as::<crate::models::RegionRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(to_region_records(&kind, rows))
    }

    /// List population links matching the given filters, one record per
    /// population row with the enclosing conservation unit nested inside.
    pub async fn list_populations(
        &self,
        params: &PopulationParams,
    ) -> Result<Vec<PopulationRecord>> {
        let overlap = params.overlap.as_deref().map(tag_as_public).transpose()?;

        let species = match params.species.as_deref() {
            Some(s) => Some(validate_species(&self.vocabulary, s).await?),
            None => None,
        };
        // A subgroup can only be checked against live data as a pair with
        // its species; on its own it is just normalized and filtered as-is.
        let subgroup = match (species.as_deref(), params.subgroup.as_deref()) {
            (Some(species), Some(sg)) => {
                Some(validate_subgroup(&self.vocabulary, species, sg).await?)
            }
            (None, Some(sg)) => Some(title_case(sg)),
            _ => None,
        };

        debug!(species = ?species, subgroup = ?subgroup, "listing populations");

        let filters = PopulationFilters {
            overlap: overlap.as_ref(),
            common_name: species.as_deref(),
            scientific_name: params.scientific_name.as_deref(),
            subgroup: subgroup.as_deref(),
            name: params.name.as_deref(),
        };

        let mut query = build_population_query(&filters);
        let rows = query
            .build_query_as::<crate::models::PopulationRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(to_population_records(rows))
    }

    /// All taxons in the database, unfiltered.
    pub async fn list_taxa(&self) -> Result<Vec<TaxonRecord>> {
        let taxa = sqlx::query_as::<_, TaxonRecord>(
            "SELECT common_name, scientific_name, subgroup FROM salmon_geometry.taxons",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(taxa)
    }
}
