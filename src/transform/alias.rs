// src/transform/alias.rs

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use super::types::PopulationRecord;

/// Data-source spellings that differ from the world-geometry gazetteer.
static BUILTIN_ALIASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("DR Congo", "Democratic Republic of the Congo"),
        ("Congo", "Republic of the Congo"),
        ("United States", "United States of America"),
        ("USA", "United States of America"),
        ("Tanzania", "United Republic of Tanzania"),
        ("Serbia", "Republic of Serbia"),
        ("Côte d'Ivoire", "Ivory Coast"),
        ("Cote d'Ivoire", "Ivory Coast"),
        ("Bahamas", "The Bahamas"),
        ("Timor-Leste", "East Timor"),
        ("Eswatini", "eSwatini"),
        ("Guinea-Bissau", "Guinea Bissau"),
        ("UK", "United Kingdom"),
        ("Czech Republic", "Czechia"),
        ("State of Palestine", "Palestine"),
    ]
});

/// Exact-string country-name substitution. Closed under substitution:
/// no target is itself a key, so `canonical` is idempotent.
#[derive(Debug, Clone)]
pub struct AliasTable {
    map: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AliasTable {
    pub fn builtin() -> Self {
        let raw = BUILTIN_ALIASES
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        // the built-in list has no chains
        Self { map: raw }
    }

    /// Built-ins overlaid with `extra` (extra wins on conflicting keys).
    /// Chains `A -> B -> C` collapse to `A -> C`; cycles are rejected.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Result<Self> {
        let mut raw: HashMap<String, String> = Self::builtin().map;
        for (from, to) in extra {
            raw.insert(from.clone(), to.clone());
        }
        Self::resolve(raw)
    }

    fn resolve(raw: HashMap<String, String>) -> Result<Self> {
        let mut map = HashMap::with_capacity(raw.len());
        for from in raw.keys() {
            let mut seen: HashSet<&str> = HashSet::new();
            seen.insert(from.as_str());
            let mut target = &raw[from];
            while let Some(next) = raw.get(target) {
                if next == target {
                    break;
                }
                if !seen.insert(target.as_str()) {
                    bail!("alias cycle through `{}`", from);
                }
                target = next;
            }
            if target == from {
                // `A -> A` or a chain leading back to itself without a cycle
                continue;
            }
            map.insert(from.clone(), target.clone());
        }
        debug!(aliases = map.len(), "alias table ready");
        Ok(Self { map })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Gazetteer spelling of `name`; unknown names pass through unchanged.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Rewrite every name in place, returning how many changed.
    pub fn apply<T>(&self, items: &mut [T], mut name: impl FnMut(&mut T) -> &mut String) -> usize {
        let mut renamed = 0;
        for item in items.iter_mut() {
            let slot = name(item);
            let canon = self.canonical(slot);
            if canon != slot.as_str() {
                *slot = canon.to_string();
                renamed += 1;
            }
        }
        renamed
    }
}

/// Population rows after renaming and collapsing.
#[derive(Debug, Default)]
pub struct NormalizedPopulation {
    pub records: Vec<PopulationRecord>,
    /// Later rows whose canonical name was already taken.
    pub duplicates: Vec<PopulationRecord>,
    pub renamed: usize,
}

/// Normalize population names and collapse records that now share a name.
/// The first record wins.
pub fn normalize_population(
    aliases: &AliasTable,
    mut records: Vec<PopulationRecord>,
) -> NormalizedPopulation {
    let renamed = aliases.apply(&mut records, |r| &mut r.country);
    debug!(renamed, "normalized population names");

    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut duplicates = Vec::new();
    for rec in records {
        if seen.insert(rec.country.clone()) {
            kept.push(rec);
        } else {
            duplicates.push(rec);
        }
    }
    if !duplicates.is_empty() {
        warn!(
            count = duplicates.len(),
            "population rows collapsed onto an existing country after alias substitution"
        );
    }
    NormalizedPopulation {
        records: kept,
        duplicates,
        renamed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dr_congo_maps_to_gazetteer_name() {
        let t = AliasTable::builtin();
        assert_eq!(t.canonical("DR Congo"), "Democratic Republic of the Congo");
        assert_eq!(t.canonical("France"), "France");
    }

    #[test]
    fn substitution_is_idempotent() {
        let mut extra = BTreeMap::new();
        extra.insert("Burma".to_string(), "Myanmar".to_string());
        extra.insert("Old Burma".to_string(), "Burma".to_string());
        let t = AliasTable::with_extra(&extra).unwrap();

        let names = [
            "DR Congo",
            "Burma",
            "Old Burma",
            "Myanmar",
            "Democratic Republic of the Congo",
            "Atlantis",
        ];
        for n in names {
            let once = t.canonical(n);
            assert_eq!(t.canonical(once), once, "not idempotent for {n}");
        }
        assert_eq!(t.canonical("Old Burma"), "Myanmar");
    }

    #[test]
    fn cycles_are_rejected() {
        let mut extra = BTreeMap::new();
        extra.insert("A".to_string(), "B".to_string());
        extra.insert("B".to_string(), "A".to_string());
        assert!(AliasTable::with_extra(&extra).is_err());
    }

    #[test]
    fn self_alias_is_dropped() {
        let mut extra = BTreeMap::new();
        extra.insert("Chad".to_string(), "Chad".to_string());
        let t = AliasTable::with_extra(&extra).unwrap();
        assert_eq!(t.canonical("Chad"), "Chad");
        assert_eq!(t.len(), AliasTable::builtin().len());
    }

    #[test]
    fn renamed_country_does_not_appear_twice() {
        let t = AliasTable::builtin();
        let records = vec![
            PopulationRecord::new("DR Congo", 109.0),
            PopulationRecord::new("Democratic Republic of the Congo", 108.0),
            PopulationRecord::new("Chad", 18.0),
        ];
        let norm = normalize_population(&t, records);
        let kept = &norm.records;
        let congo: Vec<_> = kept
            .iter()
            .filter(|r| r.country == "Democratic Republic of the Congo")
            .collect();
        assert_eq!(congo.len(), 1);
        assert_eq!(congo[0].population_2024, 109.0);
        assert!(kept.iter().all(|r| r.country != "DR Congo"));
        assert_eq!(norm.duplicates.len(), 1);
        assert_eq!(norm.renamed, 1);
        assert_eq!(kept.len(), 2);
    }
}
