pub mod aggregate;
pub mod alias;
pub mod scale;
pub mod types;

pub use aggregate::{aggregate_cases, case_change_over, Aggregation};
pub use alias::{normalize_population, AliasTable, NormalizedPopulation};
pub use scale::log1p;
pub use types::{clamp_change, CaseYear, CountryYearRecord, PopulationRecord};
