// src/transform/types.rs

use super::scale::log1p;

/// 2024 population of one country, raw and log-scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRecord {
    pub country: String,
    pub population_2024: f64,
    pub log_population: f64,
}

impl PopulationRecord {
    pub fn new(country: impl Into<String>, population_2024: f64) -> Self {
        Self {
            country: country.into(),
            population_2024,
            log_population: log1p(population_2024),
        }
    }
}

/// First and last reported cumulative case count of a country within a year.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseYear {
    pub country: String,
    pub year: i32,
    pub case_start: f64,
    pub case_end: f64,
}

impl CaseYear {
    /// Growth over the year. Downward revisions count as zero growth.
    pub fn case_change(&self) -> f64 {
        clamp_change(self.case_start, self.case_end)
    }

    pub fn log_case_change(&self) -> f64 {
        log1p(self.case_change())
    }
}

/// One (country, year) after joining population with case growth.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryYearRecord {
    pub country: String,
    pub year: i32,
    pub population: f64,
    pub case_start: f64,
    pub case_end: f64,
    pub case_change: f64,
    pub log_population: f64,
    pub log_case_change: f64,
}

impl CountryYearRecord {
    pub fn new(country: String, year: i32, population: f64, cases: &CaseYear) -> Self {
        let case_change = cases.case_change();
        Self {
            country,
            year,
            population,
            case_start: cases.case_start,
            case_end: cases.case_end,
            case_change,
            log_population: log1p(population),
            log_case_change: log1p(case_change),
        }
    }
}

/// `max(0, end - start)`
pub fn clamp_change(start: f64, end: f64) -> f64 {
    (end - start).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_change_never_negative() {
        let pairs = [(10.0, 5.0), (5.0, 10.0), (0.0, 0.0), (1e9, 0.0), (3.0, 3.5)];
        for (start, end) in pairs {
            let c = clamp_change(start, end);
            assert!(c >= 0.0);
            assert_eq!(c, (end - start).max(0.0));
        }
    }

    #[test]
    fn revision_downward_is_zero_growth() {
        let cy = CaseYear {
            country: "X".into(),
            year: 2023,
            case_start: 10.0,
            case_end: 5.0,
        };
        assert_eq!(cy.case_change(), 0.0);
        assert_eq!(cy.log_case_change(), 0.0);
    }

    #[test]
    fn country_year_carries_raw_and_log() {
        let cy = CaseYear {
            country: "X".into(),
            year: 2023,
            case_start: 1.0,
            case_end: 100.0,
        };
        let rec = CountryYearRecord::new("X".into(), 2023, 999.0, &cy);
        assert_eq!(rec.case_change, 99.0);
        assert!((rec.log_case_change - 100f64.ln()).abs() < 1e-12);
        assert!((rec.log_population - 1000f64.ln()).abs() < 1e-12);
    }
}
