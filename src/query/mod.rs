//! Query composition over the two geometry-bearing tables.
//!
//! Regions and conservation units are stored separately but presented
//! identically, and each table relates differently to the population table.
//! Four join shapes cover the combinations, chosen by two independent
//! decisions (which table, and whether a species filter is present); see
//! [`region::JoinShape`]. The population query has a single shape and lives
//! in [`population`].
//!
//! All SQL here is runtime-checked and composed with `sqlx::QueryBuilder`;
//! every filter is pushed down to PostGIS, including the coordinate
//! transform and the spatial intersects predicate.

pub mod population;
pub mod region;

pub use population::{build_population_query, PopulationFilters};
pub use region::{build_region_query, JoinShape, RegionFilters};
