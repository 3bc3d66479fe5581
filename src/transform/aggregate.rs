// src/transform/aggregate.rs

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::types::CaseYear;
use crate::load::CaseObservation;

/// Output of [`aggregate_cases`].
#[derive(Debug, Default)]
pub struct Aggregation {
    /// One entry per (country, year), sorted by country then year.
    pub years: Vec<CaseYear>,
    /// Rows skipped because `Cases` was blank or not finite.
    pub missing_cases: usize,
}

/// Group rows by (country, year) and keep the chronologically first and
/// last reported count of each group. Same-date rows keep input order.
pub fn aggregate_cases(rows: &[CaseObservation]) -> Aggregation {
    let mut groups: BTreeMap<(&str, i32), Vec<&CaseObservation>> = BTreeMap::new();
    let mut missing_cases = 0;

    for row in rows {
        match row.cases {
            Some(v) if v.is_finite() => groups
                .entry((row.country.as_str(), row.year))
                .or_default()
                .push(row),
            _ => missing_cases += 1,
        }
    }

    let mut years = Vec::with_capacity(groups.len());
    for ((country, year), mut group) in groups {
        // stable: ties keep file order
        group.sort_by_key(|r| r.date);
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let (Some(case_start), Some(case_end)) = (first.cases, last.cases) else {
            continue;
        };
        years.push(CaseYear {
            country: country.to_string(),
            year,
            case_start,
            case_end,
        });
    }

    if missing_cases > 0 {
        warn!(missing_cases, "case rows without a usable count were skipped");
    }
    debug!(groups = years.len(), "aggregated case rows");

    Aggregation {
        years,
        missing_cases,
    }
}

/// Per-country sum of clamped annual growth over `from..=to`.
pub fn case_change_over(years: &[CaseYear], from: i32, to: i32) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for cy in years.iter().filter(|cy| (from..=to).contains(&cy.year)) {
        *totals.entry(cy.country.clone()).or_insert(0.0) += cy.case_change();
    }
    totals
}
