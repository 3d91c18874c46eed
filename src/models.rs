//! Row and record types for the occurrence queries.
//!
//! Rows are what comes back from Postgres (geometry already rendered as
//! public-SRID GeoJSON text by the query layer); records are the canonical
//! shapes handed to the caller. Normalization here is pure reshaping, no
//! coordinate handling.

use serde::Serialize;
use sqlx::FromRow;

/// One row from any of the four region join shapes. Conservation-unit rows
/// have no kind column; the requested kind is injected during normalization
/// for both tables.
#[derive(Debug, Clone, FromRow)]
pub struct RegionRow {
    pub name: String,
    pub code: String,
    pub boundary: String,
    pub outlet: String,
}

/// One row from the population query: taxon attributes plus the enclosing
/// conservation unit.
#[derive(Debug, Clone, FromRow)]
pub struct PopulationRow {
    pub common_name: String,
    pub scientific_name: String,
    pub subgroup: Option<String>,
    pub cu_name: String,
    pub cu_code: String,
    pub cu_boundary: String,
    pub cu_outlet: String,
}

/// Canonical region record. `boundary` and `outlet` are public-SRID GeoJSON
/// text.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionRecord {
    pub kind: String,
    pub name: String,
    pub code: String,
    pub boundary: String,
    pub outlet: String,
}

/// The conservation unit nested inside a population record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConservationUnitSummary {
    pub name: String,
    pub code: String,
    pub boundary: String,
    pub outlet: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PopulationRecord {
    pub common_name: String,
    pub scientific_name: String,
    pub subgroup: Option<String>,
    pub conservation_unit: ConservationUnitSummary,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct TaxonRecord {
    pub common_name: String,
    pub scientific_name: String,
    pub subgroup: Option<String>,
}

/// Flatten region rows into canonical records, injecting the validated
/// request kind. Works unchanged for conservation-unit rows, whose effective
/// kind is the injected literal.
pub fn to_region_records(kind: &str, rows: Vec<RegionRow>) -> Vec<RegionRecord> {
    rows.into_iter()
        .map(|row| RegionRecord {
            kind: kind.to_string(),
            name: row.name,
            code: row.code,
            boundary: row.boundary,
            outlet: row.outlet,
        })
        .collect()
}

pub fn to_population_records(rows: Vec<PopulationRow>) -> Vec<PopulationRecord> {
    rows.into_iter()
        .map(|row| PopulationRecord {
            common_name: row.common_name,
            scientific_name: row.scientific_name,
            subgroup: row.subgroup,
            conservation_unit: ConservationUnitSummary {
                name: row.cu_name,
                code: row.cu_code,
                boundary: row.cu_boundary,
                outlet: row.cu_outlet,
            },
        })
        .collect()
}
