//! Validation of categorical filter values against what is actually in the
//! database, so a misspelled filter fails fast with a clear cause instead of
//! silently matching nothing.
//!
//! The valid sets are live data, not hard-coded enums: a region kind or a
//! (species, subgroup) pair is valid exactly when some row currently carries
//! it. Core logic depends only on the `VocabularySource` trait; the Postgres
//! implementation lives alongside it and tests stub the trait.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::{OccurrenceError, Result};

/// The literal kind under which conservation units are exposed. They live in
/// their own table with no kind column, so this value never comes from
/// storage.
pub const CONSERVATION_UNIT_KIND: &str = "conservation_unit";

/// Distinct-value lookups backing validation.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    /// Region kinds currently present in the regions table (not including
    /// the injected conservation-unit kind).
    async fn region_kinds(&self) -> Result<BTreeSet<String>>;

    /// Species common names currently present in the taxons table.
    async fn species_names(&self) -> Result<BTreeSet<String>>;

    /// Subgroups currently carried by taxon rows of the given species.
    /// Point-in-time: a subgroup with no remaining rows is unknown, and a
    /// species with no subgroup concept yields the empty set.
    async fn species_subgroups(&self, species: &str) -> Result<BTreeSet<String>>;
}

/// Case-insensitive region-kind validation. Returns the stored spelling,
/// which is what the composed query must bind for its kind filter to match.
pub async fn validate_region_kind(source: &dyn VocabularySource, kind: &str) -> Result<String> {
    let wanted = kind.to_lowercase();
    let mut kinds = source.region_kinds().await?;
    kinds.insert(CONSERVATION_UNIT_KIND.to_string());

    if let Some(stored) = kinds.iter().find(|k| k.to_lowercase() == wanted) {
        Ok(stored.clone())
    } else {
        Err(OccurrenceError::UnknownRegionKind {
            value: kind.to_string(),
            valid: kinds.into_iter().collect(),
        })
    }
}

/// Title-cases a species common name and checks it against the live species
/// set. Returns the normalized name.
pub async fn validate_species(source: &dyn VocabularySource, common_name: &str) -> Result<String> {
    let normalized = title_case(common_name);
    let species = source.species_names().await?;

    if species.contains(&normalized) {
        Ok(normalized)
    } else {
        Err(OccurrenceError::UnknownSpecies {
            value: common_name.to_string(),
            valid: species.into_iter().collect(),
        })
    }
}

/// Title-cases a subgroup and requires a live taxon row carrying the exact
/// (species, subgroup) pair. An invalid species is reported as such rather
/// than as a bad subgroup.
pub async fn validate_subgroup(
    source: &dyn VocabularySource,
    species: &str,
    subgroup: &str,
) -> Result<String> {
    let species = validate_species(source, species).await?;
    let normalized = title_case(subgroup);
    let subgroups = source.species_subgroups(&species).await?;

    if subgroups.contains(&normalized) {
        Ok(normalized)
    } else {
        Err(OccurrenceError::UnknownSubgroup {
            species,
            value: subgroup.to_string(),
            valid: subgroups.into_iter().collect(),
        })
    }
}

pub(crate) fn title_case(value: &str) -> String {
    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => lower,
    }
}

/// Live vocabulary lookups against the salmon_geometry schema.
#[derive(Clone)]
pub struct PgVocabulary {
    pool: PgPool,
}

impl PgVocabulary {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VocabularySource for PgVocabulary {
    async fn region_kinds(&self) -> Result<BTreeSet<String>> {
        let rows = sqlx::query("SELECT DISTINCT kind FROM salmon_geometry.regions")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>("kind")).collect())
    }

    async fn species_names(&self) -> Result<BTreeSet<String>> {
        let rows = sqlx::query("SELECT DISTINCT common_name FROM salmon_geometry.taxons")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| r.get::<String, _>("common_name"))
            .collect())
    }

    async fn species_subgroups(&self, species: &str) -> Result<BTreeSet<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT subgroup FROM salmon_geometry.taxons \
             WHERE common_name = $1 AND subgroup IS NOT NULL",
        )
        .bind(species)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| r.get::<String, _>("subgroup"))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory vocabulary mirroring the usual live content: watershed and
    /// basin regions, the five Pacific salmon species, subgroups for Pink
    /// (Odd/Even) and Sockeye (Lake/River).
    pub(crate) struct StubVocabulary;

    #[async_trait]
    impl VocabularySource for StubVocabulary {
        async fn region_kinds(&self) -> Result<BTreeSet<String>> {
            Ok(["basin", "watershed"].iter().map(|s| s.to_string()).collect())
        }

        async fn species_names(&self) -> Result<BTreeSet<String>> {
            Ok(["Chinook", "Chum", "Coho", "Pink", "Sockeye"]
                .iter()
                .map(|s| s.to_string())
                .collect())
        }

        async fn species_subgroups(&self, species: &str) -> Result<BTreeSet<String>> {
            let subgroups: &[&str] = match species {
                "Pink" => &["Odd", "Even"],
                "Sockeye" => &["Lake", "River"],
                _ => &[],
            };
            Ok(subgroups.iter().map(|s| s.to_string()).collect())
        }
    }

    /// Vocabulary whose stored kind spelling is not lowercase.
    struct MixedCaseVocabulary;

    #[async_trait]
    impl VocabularySource for MixedCaseVocabulary {
        async fn region_kinds(&self) -> Result<BTreeSet<String>> {
            Ok(["Watershed"].iter().map(|s| s.to_string()).collect())
        }

        async fn species_names(&self) -> Result<BTreeSet<String>> {
            Ok(BTreeSet::new())
        }

        async fn species_subgroups(&self, _species: &str) -> Result<BTreeSet<String>> {
            Ok(BTreeSet::new())
        }
    }

    #[tokio::test]
    async fn accepts_known_kind_case_insensitively() {
        assert_eq!(
            validate_region_kind(&StubVocabulary, "Basin").await.unwrap(),
            "basin"
        );
        assert_eq!(
            validate_region_kind(&StubVocabulary, "watershed").await.unwrap(),
            "watershed"
        );
    }

    #[tokio::test]
    async fn matches_mixed_case_stored_kind_and_returns_stored_spelling() {
        for input in ["Watershed", "watershed", "WATERSHED"] {
            assert_eq!(
                validate_region_kind(&MixedCaseVocabulary, input)
                    .await
                    .unwrap(),
                "Watershed",
                "input {input}"
            );
        }
    }

    #[tokio::test]
    async fn conservation_unit_is_always_a_valid_kind() {
        assert_eq!(
            validate_region_kind(&StubVocabulary, "Conservation_Unit")
                .await
                .unwrap(),
            "conservation_unit"
        );
    }

    #[tokio::test]
    async fn rejects_unknown_kind_listing_valid_set() {
        let err = validate_region_kind(&StubVocabulary, "banana")
            .await
            .unwrap_err();
        match err {
            OccurrenceError::UnknownRegionKind { value, valid } => {
                assert_eq!(value, "banana");
                assert!(valid.contains(&"watershed".to_string()));
                assert!(valid.contains(&"conservation_unit".to_string()));
            }
            other => panic!("expected UnknownRegionKind, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn title_cases_species() {
        assert_eq!(
            validate_species(&StubVocabulary, "pink").await.unwrap(),
            "Pink"
        );
        assert_eq!(
            validate_species(&StubVocabulary, "CHUM").await.unwrap(),
            "Chum"
        );
    }

    #[tokio::test]
    async fn rejects_unknown_species() {
        for bogus in ["Chummmm", "Banana", "489"] {
            let err = validate_species(&StubVocabulary, bogus).await.unwrap_err();
            assert!(matches!(err, OccurrenceError::UnknownSpecies { .. }));
        }
    }

    #[tokio::test]
    async fn accepts_subgroup_pairs_that_exist() {
        assert_eq!(
            validate_subgroup(&StubVocabulary, "Pink", "odd").await.unwrap(),
            "Odd"
        );
        assert_eq!(
            validate_subgroup(&StubVocabulary, "pink", "even")
                .await
                .unwrap(),
            "Even"
        );
        assert_eq!(
            validate_subgroup(&StubVocabulary, "Sockeye", "lake")
                .await
                .unwrap(),
            "Lake"
        );
    }

    #[tokio::test]
    async fn rejects_subgroup_of_wrong_species() {
        let err = validate_subgroup(&StubVocabulary, "Chum", "Odd")
            .await
            .unwrap_err();
        match err {
            OccurrenceError::UnknownSubgroup { species, valid, .. } => {
                assert_eq!(species, "Chum");
                assert!(valid.is_empty());
            }
            other => panic!("expected UnknownSubgroup, got {other:?}"),
        }

        let err = validate_subgroup(&StubVocabulary, "Pink", "Lake")
            .await
            .unwrap_err();
        match err {
            OccurrenceError::UnknownSubgroup { valid, .. } => {
                assert_eq!(valid, ["Even", "Odd"]);
            }
            other => panic!("expected UnknownSubgroup, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bad_species_wins_over_bad_subgroup() {
        let err = validate_subgroup(&StubVocabulary, "Banana", "Odd")
            .await
            .unwrap_err();
        assert!(matches!(err, OccurrenceError::UnknownSpecies { .. }));
    }
}
