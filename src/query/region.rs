//! The four region join shapes.
//!
//! 1. conservation unit, no species: plain select on conservation_units
//! 2. conservation unit with species: key join through populations to taxons
//! 3. other region, no species: plain select on regions filtered by kind
//! 4. other region with species: spatial join (boundary intersects) from
//!    regions to conservation_units, then key joins onward
//!
//! Shape 4 exists because regions and conservation units share no key: the
//! only way to relate a region to species presence is geometric. A region
//! "contains" a species when its boundary intersects any conservation unit
//! holding that species. That is an approximation, and downstream consumers
//! depend on it behaving exactly this way, so it must not be tightened to
//! strict containment.

use sqlx::{Postgres, QueryBuilder};

use crate::projection::{geojson_out, to_public, TaggedGeometry};
use crate::vocabulary::CONSERVATION_UNIT_KIND;

const REGIONS: &str = "salmon_geometry.regions";
const CONSERVATION_UNITS: &str = "salmon_geometry.conservation_units";
const POPULATIONS: &str = "salmon_geometry.populations";
const TAXONS: &str = "salmon_geometry.taxons";

/// Validated, normalized filter set for a region query. Geometry must
/// already be tagged public; categorical values must already have passed
/// vocabulary validation.
#[derive(Debug, Default)]
pub struct RegionFilters<'a> {
    pub kind: &'a str,
    pub overlap: Option<&'a TaggedGeometry>,
    pub name: Option<&'a str>,
    pub code: Option<&'a str>,
    pub species: Option<&'a str>,
    pub subgroup: Option<&'a str>,
}

/// Which of the four join structures a request resolves to. Driven by two
/// independent booleans, never by nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinShape {
    CuGeometryOnly,
    CuWithTaxon,
    RegionGeometryOnly,
    RegionWithTaxon,
}

impl JoinShape {
    pub fn select(kind: &str, species_filtered: bool) -> Self {
        match (kind == CONSERVATION_UNIT_KIND, species_filtered) {
            (true, false) => Self::CuGeometryOnly,
            (true, true) => Self::CuWithTaxon,
            (false, false) => Self::RegionGeometryOnly,
            (false, true) => Self::RegionWithTaxon,
        }
    }

    /// The table whose rows the query ultimately describes; shared filters
    /// and the select list all target this table.
    fn base_table(&self) -> &'static str {
        match self {
            Self::CuGeometryOnly | Self::CuWithTaxon => CONSERVATION_UNITS,
            Self::RegionGeometryOnly | Self::RegionWithTaxon => REGIONS,
        }
    }

    fn species_joined(&self) -> bool {
        matches!(self, Self::CuWithTaxon | Self::RegionWithTaxon)
    }
}

/// Compose the region query for an already-validated filter set. The
/// resulting rows decode as [`crate::models::RegionRow`].
pub fn build_region_query<'a>(filters: &RegionFilters<'a>) -> QueryBuilder<'a, Postgres> {
    let shape = JoinShape::select(filters.kind, filters.species.is_some());
    let table = shape.base_table();

    // One region can match several population rows for the same species
    // (one per life-history variant), but the caller wants one presence
    // record per region.
    let select = if shape.species_joined() {
        "SELECT DISTINCT "
    } else {
        "SELECT "
    };

    let mut qb = QueryBuilder::new(select);
    qb.push(format!(
        "{table}.name AS name, {table}.code AS code, \
         {boundary} AS boundary, {outlet} AS outlet FROM {table}",
        boundary = geojson_out(&format!("{table}.boundary")),
        outlet = geojson_out(&format!("{table}.outlet")),
    ));

    match shape {
        JoinShape::CuGeometryOnly => {}
        JoinShape::CuWithTaxon => push_population_joins(&mut qb),
        JoinShape::RegionGeometryOnly => {}
        JoinShape::RegionWithTaxon => {
            // Spatial bridge to conservation units, then the usual key joins.
            qb.push(format!(
                " JOIN {CONSERVATION_UNITS} \
                 ON ST_Intersects({CONSERVATION_UNITS}.boundary, {REGIONS}.boundary)"
            ));
            push_population_joins(&mut qb);
        }
    }

    qb.push(" WHERE 1=1");

    if table == REGIONS {
        qb.push(format!(" AND {REGIONS}.kind = "));
        qb.push_bind(filters.kind);
    }

    if let Some(species) = filters.species {
        qb.push(format!(" AND {TAXONS}.common_name = "));
        qb.push_bind(species);
        if let Some(subgroup) = filters.subgroup {
            qb.push(format!(" AND {TAXONS}.subgroup = "));
            qb.push_bind(subgroup);
        }
    }

    push_shared_filters(&mut qb, table, filters.overlap, filters.name, filters.code);

    qb
}

fn push_population_joins(qb: &mut QueryBuilder<'_, Postgres>) {
    qb.push(format!(
        " JOIN {POPULATIONS} \
         ON {POPULATIONS}.conservation_unit_id = {CONSERVATION_UNITS}.id \
         JOIN {TAXONS} ON {POPULATIONS}.taxon_id = {TAXONS}.id"
    ));
}

/// The filters applied identically across all shapes: overlap geometry,
/// exact name, exact code. Each is independently optional and AND-combined.
pub(crate) fn push_shared_filters<'a>(
    qb: &mut QueryBuilder<'a, Postgres>,
    table: &str,
    overlap: Option<&'a TaggedGeometry>,
    name: Option<&'a str>,
    code: Option<&'a str>,
) {
    if let Some(overlap) = overlap {
        qb.push(format!(
            " AND ST_Intersects({}, ST_GeomFromGeoJSON(",
            to_public(&format!("{table}.boundary"))
        ));
        qb.push_bind(overlap.as_geojson());
        qb.push("))");
    }

    if let Some(name) = name {
        qb.push(format!(" AND {table}.name = "));
        qb.push_bind(name);
    }

    if let Some(code) = code {
        qb.push(format!(" AND {table}.code = "));
        qb.push_bind(code);
    }
}
