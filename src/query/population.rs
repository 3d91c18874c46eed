//! The population query: taxon attributes joined to the enclosing
//! conservation unit. One row per population link; unlike the region
//! shapes this is deliberately not deduplicated, since the caller is asking
//! about the population links themselves.

use sqlx::{Postgres, QueryBuilder};

use crate::projection::{geojson_out, TaggedGeometry};
use crate::query::region::push_shared_filters;

const CONSERVATION_UNITS: &str = "salmon_geometry.conservation_units";
const POPULATIONS: &str = "salmon_geometry.populations";
const TAXONS: &str = "salmon_geometry.taxons";

/// Validated, normalized filter set for a population query. `name` targets
/// the enclosing conservation unit.
#[derive(Debug, Default)]
pub struct PopulationFilters<'a> {
    pub overlap: Option<&'a TaggedGeometry>,
    pub common_name: Option<&'a str>,
    pub scientific_name: Option<&'a str>,
    pub subgroup: Option<&'a str>,
    pub name: Option<&'a str>,
}

/// Compose the population query. Rows decode as
/// [`crate::models::PopulationRow`].
pub fn build_population_query<'a>(filters: &PopulationFilters<'a>) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {TAXONS}.common_name AS common_name, \
         {TAXONS}.scientific_name AS scientific_name, \
         {TAXONS}.subgroup AS subgroup, \
         {CONSERVATION_UNITS}.name AS cu_name, \
         {CONSERVATION_UNITS}.code AS cu_code, \
         {boundary} AS cu_boundary, {outlet} AS cu_outlet \
         FROM {CONSERVATION_UNITS} \
         JOIN {POPULATIONS} \
         ON {POPULATIONS}.conservation_unit_id = {CONSERVATION_UNITS}.id \
         JOIN {TAXONS} ON {POPULATIONS}.taxon_id = {TAXONS}.id \
         WHERE 1=1",
        boundary = geojson_out(&format!("{CONSERVATION_UNITS}.boundary")),
        outlet = geojson_out(&format!("{CONSERVATION_UNITS}.outlet")),
    ));

    if let Some(common_name) = filters.common_name {
        qb.push(format!(" AND {TAXONS}.common_name = "));
        qb.push_bind(common_name);
    }

    if let Some(scientific_name) = filters.scientific_name {
        qb.push(format!(" AND {TAXONS}.scientific_name = "));
        qb.push_bind(scientific_name);
    }

    if let Some(subgroup) = filters.subgroup {
        qb.push(format!(" AND {TAXONS}.subgroup = "));
        qb.push_bind(subgroup);
    }

    push_shared_filters(&mut qb, CONSERVATION_UNITS, filters.overlap, filters.name, None);

    qb
}
