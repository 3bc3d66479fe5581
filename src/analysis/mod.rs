// src/analysis/mod.rs
pub mod correlation;
pub mod join;
pub mod regression;

pub use correlation::{pearson, CorrelationSummary};
pub use join::JoinResult;
pub use regression::{BandPoint, Regression};

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use crate::load::PopulationYear;
use crate::transform::{CaseYear, CountryYearRecord};

pub type CountryYear = (String, i32);

/// Inner join of population and case growth on (country, year).
/// Names must already be normalized on both sides.
#[tracing::instrument(level = "info", skip_all, fields(population = population.len(), cases = cases.len()))]
pub fn merge_population_cases(
    population: &[PopulationYear],
    cases: &[CaseYear],
) -> JoinResult<CountryYearRecord, CountryYear> {
    let mut pop_by_key: BTreeMap<(&str, i32), f64> = BTreeMap::new();
    let mut duplicate_keys = 0;
    for p in population {
        if pop_by_key
            .insert((p.country.as_str(), p.year), p.population)
            .is_some()
        {
            duplicate_keys += 1;
        }
    }
    if duplicate_keys > 0 {
        warn!(duplicate_keys, "population rows repeat a (country, year); last one kept");
    }

    let mut matched = Vec::new();
    let mut unmatched_right = Vec::new();
    let mut used: BTreeSet<(&str, i32)> = BTreeSet::new();
    for cy in cases {
        let key = (cy.country.as_str(), cy.year);
        match pop_by_key.get(&key) {
            Some(&population) => {
                used.insert(key);
                matched.push(CountryYearRecord::new(
                    cy.country.clone(),
                    cy.year,
                    population,
                    cy,
                ));
            }
            None => unmatched_right.push((cy.country.clone(), cy.year)),
        }
    }
    matched.sort_by(|a, b| (a.country.as_str(), a.year).cmp(&(b.country.as_str(), b.year)));

    let unmatched_left: Vec<CountryYear> = pop_by_key
        .keys()
        .filter(|k| !used.contains(*k))
        .map(|(c, y)| (c.to_string(), *y))
        .collect();

    info!(
        matched = matched.len(),
        population_only = unmatched_left.len(),
        cases_only = unmatched_right.len(),
        "merged population with case growth"
    );

    JoinResult {
        matched,
        unmatched_left,
        unmatched_right,
    }
}

/// Correlation and linear fit of `log_population` vs `log_case_change`.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub correlation: CorrelationSummary,
    pub regression: Option<Regression>,
    /// Complete `(log_population, log_case_change)` pairs, plot-ready.
    pub points: Vec<(f64, f64)>,
}

pub fn analyze(records: &[CountryYearRecord]) -> Analysis {
    let correlation = pearson(
        records
            .iter()
            .map(|r| (Some(r.log_population), Some(r.log_case_change))),
    );
    let points: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (r.log_population, r.log_case_change))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let regression = Regression::fit(&points);

    match correlation.r {
        Some(r) => info!(r, used = correlation.used, excluded = correlation.excluded, "pearson correlation"),
        None => warn!(
            used = correlation.used,
            excluded = correlation.excluded,
            "pearson correlation undefined"
        ),
    }

    Analysis {
        correlation,
        regression,
        points,
    }
}
