//! Population vs. COVID-19 case growth: CSV loading, country-name
//! normalization, per-year aggregation, choropleth maps and a correlation plot.

pub mod analysis;
pub mod config;
pub mod geo;
pub mod load;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod transform;

pub use analysis::{merge_population_cases, CorrelationSummary, JoinResult, Regression};
pub use config::PipelineConfig;
pub use pipeline::{run, PipelineOutcome};
pub use transform::{AliasTable, CaseYear, CountryYearRecord, PopulationRecord};
