//! Coordinate-reference-system handling between the storage projection and
//! the public projection.
//!
//! Stored geometry is in BC Albers (SRID 3005); everything that crosses the
//! system boundary is EPSG 4326. The transform itself always runs inside
//! PostGIS, so the outbound direction here is SQL-fragment rendering, not
//! geometry math. Inbound WKT literals carry no reference system and get an
//! explicit 4326 tag before they are ever compared against stored geometry.
//!
//! GeoJSON is officially always 4326 (RFC 7946 §4), but consumers of this
//! API still rely on the deprecated "crs" member, so we emit it.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::error::{OccurrenceError, Result};

/// SRID of stored geometry (BC Albers).
pub const INTERNAL_SRID: i32 = 3005;
/// SRID of everything crossing the system boundary.
pub const PUBLIC_SRID: i32 = 4326;

static POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^POINT\s*\(\s*(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)\s*\)$").unwrap()
});

static POLYGON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^POLYGON\s*\(\(\s*(-?\d+(?:\.\d+)?\s+-?\d+(?:\.\d+)?(?:\s*,\s*-?\d+(?:\.\d+)?\s+-?\d+(?:\.\d+)?)*)\s*\)\)$",
    )
    .unwrap()
});

/// A geometry literal re-expressed as GeoJSON with an explicit public-SRID
/// tag, ready to bind as a filter argument.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedGeometry(String);

impl TaggedGeometry {
    pub fn as_geojson(&self) -> &str {
        &self.0
    }
}

/// Render the SQL fragment that re-expresses a stored geometry expression in
/// the public reference system. Side-effect free; the source column is never
/// mutated.
pub fn to_public(expr: &str) -> String {
    format!("ST_Transform({expr}, {PUBLIC_SRID})")
}

/// Render the SQL fragment producing the portable public-SRID GeoJSON text
/// of a stored geometry expression. Option bit 2 makes PostGIS embed the
/// short crs member, so the output carries its reference system explicitly.
pub fn geojson_out(expr: &str) -> String {
    format!("ST_AsGeoJSON({}, 9, 2)", to_public(expr))
}

/// Tag a caller-supplied WKT literal (no embedded reference system) as
/// public-SRID GeoJSON. Only POINT and POLYGON are supported; anything else
/// fails with `MalformedGeometry`.
pub fn tag_as_public(wkt: &str) -> Result<TaggedGeometry> {
    let wkt = wkt.trim();

    let mut geom = if let Some(caps) = POINT_RE.captures(wkt) {
        let x = parse_ordinate(wkt, &caps[1])?;
        let y = parse_ordinate(wkt, &caps[2])?;
        json!({ "type": "Point", "coordinates": [x, y] })
    } else if let Some(caps) = POLYGON_RE.captures(wkt) {
        let mut ring = Vec::new();
        for pair in caps[1].split(',') {
            let mut ordinates = pair.split_whitespace();
            let (Some(x), Some(y)) = (ordinates.next(), ordinates.next()) else {
                return Err(malformed(wkt, "incomplete coordinate pair"));
            };
            ring.push(vec![parse_ordinate(wkt, x)?, parse_ordinate(wkt, y)?]);
        }
        json!({ "type": "Polygon", "coordinates": [ring] })
    } else if wkt.starts_with("POINT") {
        return Err(malformed(wkt, "could not parse WKT POINT"));
    } else if wkt.starts_with("POLYGON") {
        return Err(malformed(wkt, "could not parse WKT POLYGON"));
    } else {
        return Err(malformed(
            wkt,
            "only POINT and POLYGON geometries are supported",
        ));
    };

    geom["crs"] = json!({ "type": "name", "properties": { "name": format!("epsg:{PUBLIC_SRID}") } });

    Ok(TaggedGeometry(geom.to_string()))
}

fn parse_ordinate(wkt: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|e| malformed(wkt, &format!("bad ordinate {raw:?}: {e}")))
}

fn malformed(input: &str, reason: &str) -> OccurrenceError {
    OccurrenceError::MalformedGeometry {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn to_public_renders_transform() {
        assert_eq!(
            to_public("regions.boundary"),
            "ST_Transform(regions.boundary, 4326)"
        );
    }

    #[test]
    fn geojson_out_wraps_transform() {
        assert_eq!(
            geojson_out("conservation_units.outlet"),
            "ST_AsGeoJSON(ST_Transform(conservation_units.outlet, 4326), 9, 2)"
        );
    }

    #[test]
    fn tags_a_point() {
        let tagged = tag_as_public("POINT(7 7)").unwrap();
        let v: Value = serde_json::from_str(tagged.as_geojson()).unwrap();
        assert_eq!(v["type"], "Point");
        assert_eq!(v["coordinates"], serde_json::json!([7.0, 7.0]));
        assert_eq!(v["crs"]["properties"]["name"], "epsg:4326");
    }

    #[test]
    fn tags_a_point_with_space_and_negatives() {
        let tagged = tag_as_public("POINT (-123.5 49.25)").unwrap();
        let v: Value = serde_json::from_str(tagged.as_geojson()).unwrap();
        assert_eq!(v["coordinates"], serde_json::json!([-123.5, 49.25]));
    }

    #[test]
    fn tags_a_polygon() {
        let tagged = tag_as_public("POLYGON((0 0, 0 10, 10 10, 10 0, 0 0))").unwrap();
        let v: Value = serde_json::from_str(tagged.as_geojson()).unwrap();
        assert_eq!(v["type"], "Polygon");
        let ring = v["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[2], serde_json::json!([10.0, 10.0]));
        assert_eq!(v["crs"]["properties"]["name"], "epsg:4326");
    }

    #[test]
    fn rejects_unsupported_shape() {
        let err = tag_as_public("LINESTRING(0 0, 1 1)").unwrap_err();
        assert!(matches!(err, OccurrenceError::MalformedGeometry { .. }));
    }

    #[test]
    fn rejects_mangled_point() {
        let err = tag_as_public("POINT(banana 7)").unwrap_err();
        assert!(matches!(err, OccurrenceError::MalformedGeometry { .. }));
    }

    #[test]
    fn rejects_unterminated_polygon() {
        let err = tag_as_public("POLYGON((0 0, 0 10, 10 10").unwrap_err();
        assert!(matches!(err, OccurrenceError::MalformedGeometry { .. }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(tag_as_public("seven degrees north").is_err());
    }
}
