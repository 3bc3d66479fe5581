// src/pipeline.rs

use anyhow::Result;
use std::{path::PathBuf, time::Instant};
use tracing::info;

use crate::analysis::{self, Analysis, CountryYear, JoinResult};
use crate::config::PipelineConfig;
use crate::geo::WorldGeometry;
use crate::load::{self, CaseObservation, PopulationYear};
use crate::render::{self, ChoroplethStyle, ChoroplethSummary, LegendScale, ScatterLabels};
use crate::transform::{
    aggregate_cases, case_change_over, log1p, normalize_population, AliasTable, Aggregation,
    PopulationRecord,
};

/// Raw inputs, read in full before anything is written.
pub struct Inputs {
    pub cases: Vec<CaseObservation>,
    pub population_by_year: Vec<PopulationYear>,
    pub population_2024: Vec<PopulationRecord>,
    pub world: WorldGeometry,
}

/// Inputs after name normalization and aggregation.
pub struct Prepared {
    pub population_2024: Vec<PopulationRecord>,
    /// 2024 rows that collapsed onto an existing country after renaming.
    pub population_duplicates: usize,
    pub population_by_year: Vec<PopulationYear>,
    pub cases: Aggregation,
    pub renamed: usize,
}

#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub path: PathBuf,
    pub summary: ChoroplethSummary,
    /// Data countries with no polygon.
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub case_rows: usize,
    pub population_by_year_rows: usize,
    pub population_2024_rows: usize,
    pub missing_cases: usize,
    pub population_duplicates: usize,
    pub country_years: usize,
    pub renamed: usize,
    pub population_map: MapOutcome,
    pub case_change_map: MapOutcome,
    pub merged: usize,
    pub population_only: Vec<CountryYear>,
    pub cases_only: Vec<CountryYear>,
    pub analysis: Analysis,
    pub correlation_path: PathBuf,
}

pub fn load_inputs(cfg: &PipelineConfig) -> Result<Inputs> {
    Ok(Inputs {
        cases: load::load_cases(&cfg.inputs.cases_csv)?,
        population_by_year: load::load_population_by_year(&cfg.inputs.population_by_year_csv)?,
        population_2024: load::load_population_2024(&cfg.inputs.population_2024_csv)?,
        world: WorldGeometry::from_path(&cfg.inputs.world_geojson, &cfg.map.name_property)?,
    })
}

/// Rename countries to the gazetteer spelling, then aggregate cases.
pub fn prepare(
    aliases: &AliasTable,
    mut cases: Vec<CaseObservation>,
    mut population_by_year: Vec<PopulationYear>,
    population_2024: Vec<PopulationRecord>,
) -> Prepared {
    let mut renamed = aliases.apply(&mut cases, |c| &mut c.country);
    renamed += aliases.apply(&mut population_by_year, |p| &mut p.country);
    let population = normalize_population(aliases, population_2024);
    renamed += population.renamed;
    let aggregated = aggregate_cases(&cases);

    info!(
        renamed,
        country_years = aggregated.years.len(),
        "normalized and aggregated"
    );

    Prepared {
        population_2024: population.records,
        population_duplicates: population.duplicates.len(),
        population_by_year,
        cases: aggregated,
        renamed,
    }
}

/// `(country, log1p(population 2024))` for the population map.
pub fn population_map_values(population: &[PopulationRecord]) -> Vec<(String, f64)> {
    population
        .iter()
        .map(|p| (p.country.clone(), p.log_population))
        .collect()
}

/// `(country, log1p(summed growth over the window))` for the case map.
pub fn case_change_map_values(prepared: &Prepared, from: i32, to: i32) -> Vec<(String, f64)> {
    case_change_over(&prepared.cases.years, from, to)
        .into_iter()
        .map(|(country, change)| (country, log1p(change)))
        .collect()
}

fn check_join<T>(
    joined: &JoinResult<T, String>,
    stage: &str,
    cfg: &PipelineConfig,
) -> Result<()> {
    joined.warn_unmatched(stage);
    if cfg.map.fail_on_unmatched {
        joined.ensure_complete(stage)?;
    }
    Ok(())
}

/// Load → transform → two maps + correlation plot.
#[tracing::instrument(level = "info", skip_all)]
pub fn run(cfg: &PipelineConfig) -> Result<PipelineOutcome> {
    let start = Instant::now();
    cfg.validate()?;
    let aliases = AliasTable::with_extra(&cfg.aliases)?;

    // ─── 1) load everything up front ───────────────────────────────
    let inputs = load_inputs(cfg)?;
    let case_rows = inputs.cases.len();
    let population_by_year_rows = inputs.population_by_year.len();
    let population_2024_rows = inputs.population_2024.len();
    let world = inputs.world;

    // ─── 2) normalize + aggregate ──────────────────────────────────
    let prepared = prepare(
        &aliases,
        inputs.cases,
        inputs.population_by_year,
        inputs.population_2024,
    );

    // ─── 3) geometry joins (checked before any file is written) ────
    let pop_join = world.join(population_map_values(&prepared.population_2024));
    check_join(&pop_join, "population map", cfg)?;
    let (from, to) = (cfg.analysis.case_change_from, cfg.analysis.case_change_to);
    let case_join = world.join(case_change_map_values(&prepared, from, to));
    check_join(&case_join, "case-change map", cfg)?;

    // ─── 4) maps ───────────────────────────────────────────────────
    let pop_summary = render::render_choropleth(
        &cfg.outputs.population_map_png,
        &world,
        &pop_join,
        &ChoroplethStyle {
            title: "Population (2024)",
            legend_title: "Population",
            scale: LegendScale::Log1p,
        },
        &cfg.map,
    )?;
    let case_title = format!("COVID-19 case change ({from}-{to})");
    let case_summary = render::render_choropleth(
        &cfg.outputs.case_change_map_png,
        &world,
        &case_join,
        &ChoroplethStyle {
            title: &case_title,
            legend_title: "New cases",
            scale: LegendScale::Log1p,
        },
        &cfg.map,
    )?;

    // ─── 5) merge + correlation ────────────────────────────────────
    let merged =
        analysis::merge_population_cases(&prepared.population_by_year, &prepared.cases.years);
    merged.warn_unmatched("population/case merge");
    let result = analysis::analyze(&merged.matched);
    render::render_scatter(
        &cfg.outputs.correlation_png,
        &result,
        &ScatterLabels {
            title: "Population vs. annual case change",
            x: "log(1 + population)",
            y: "log(1 + case change)",
        },
        &cfg.scatter,
    )?;

    info!(elapsed = ?start.elapsed(), "pipeline finished");

    Ok(PipelineOutcome {
        case_rows,
        population_by_year_rows,
        population_2024_rows,
        missing_cases: prepared.cases.missing_cases,
        population_duplicates: prepared.population_duplicates,
        country_years: prepared.cases.years.len(),
        renamed: prepared.renamed,
        population_map: MapOutcome {
            path: cfg.outputs.population_map_png.clone(),
            summary: pop_summary,
            unmatched: pop_join.unmatched_left,
        },
        case_change_map: MapOutcome {
            path: cfg.outputs.case_change_map_png.clone(),
            summary: case_summary,
            unmatched: case_join.unmatched_left,
        },
        merged: merged.matched.len(),
        population_only: merged.unmatched_left,
        cases_only: merged.unmatched_right,
        analysis: result,
        correlation_path: cfg.outputs.correlation_png.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,popcases=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const WORLD: &str = r#"{"type": "FeatureCollection", "features": [
      {"type": "Feature", "properties": {"ADMIN": "X"},
       "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,0]]]}},
      {"type": "Feature", "properties": {"ADMIN": "Democratic Republic of the Congo"},
       "geometry": {"type": "Polygon", "coordinates": [[[20,0],[30,0],[30,10],[20,0]]]}}
    ]}"#;

    fn write_inputs(dir: &Path, extra_case_rows: &str) -> PipelineConfig {
        let mut cfg = PipelineConfig::default();
        cfg.inputs.cases_csv = dir.join("cases.csv");
        cfg.inputs.population_by_year_csv = dir.join("pop_year.csv");
        cfg.inputs.population_2024_csv = dir.join("pop_2024.csv");
        cfg.inputs.world_geojson = dir.join("world.geojson");
        cfg.outputs.population_map_png = dir.join("out/pop.png");
        cfg.outputs.case_change_map_png = dir.join("out/cases.png");
        cfg.outputs.correlation_png = dir.join("out/corr.png");
        cfg.map.width = 640;
        cfg.map.height = 372;
        cfg.scatter.width = 640;
        cfg.scatter.height = 480;

        fs::write(
            &cfg.inputs.cases_csv,
            format!(
                "Country,Date,Cases\n\
                 X,2023-01-01,10\n\
                 X,2023-12-31,5\n\
                 DR Congo,2023-01-01,100\n\
                 DR Congo,2023-12-31,400\n\
                 {extra_case_rows}"
            ),
        )
        .unwrap();
        fs::write(
            &cfg.inputs.population_by_year_csv,
            "Country,Year,pop\nX,2023,100\nDR Congo,2023,1000\n",
        )
        .unwrap();
        fs::write(
            &cfg.inputs.population_2024_csv,
            "country,pop2024\nX,100\nDR Congo,109000000\n",
        )
        .unwrap();
        fs::write(&cfg.inputs.world_geojson, WORLD).unwrap();
        cfg
    }

    #[test]
    fn prepare_renames_and_aggregates() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let cfg = write_inputs(tmp.path(), "");
        let inputs = load_inputs(&cfg)?;
        let prepared = prepare(
            &AliasTable::builtin(),
            inputs.cases,
            inputs.population_by_year,
            inputs.population_2024,
        );

        assert_eq!(prepared.renamed, 4);
        assert_eq!(prepared.cases.years.len(), 2);
        let x = prepared
            .cases
            .years
            .iter()
            .find(|c| c.country == "X")
            .unwrap();
        assert_eq!(x.case_change(), 0.0);
        assert_eq!(x.log_case_change(), 0.0);

        let values = case_change_map_values(&prepared, 2023, 2024);
        let congo = values
            .iter()
            .find(|(c, _)| c == "Democratic Republic of the Congo")
            .unwrap();
        assert!((congo.1 - 301f64.ln()).abs() < 1e-12);

        let joined = world_join_names(&inputs.world, &prepared);
        assert!(joined.is_empty(), "{joined:?}");
        Ok(())
    }

    fn world_join_names(world: &WorldGeometry, prepared: &Prepared) -> Vec<String> {
        world
            .join(population_map_values(&prepared.population_2024))
            .unmatched_left
    }

    #[test]
    fn unmatched_country_aborts_before_any_output() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let mut cfg = write_inputs(tmp.path(), "Atlantis,2023-05-01,1\nAtlantis,2024-05-01,9\n");
        cfg.map.fail_on_unmatched = true;

        let err = run(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("Atlantis"), "{err:#}");
        assert!(!cfg.outputs.population_map_png.exists());
        assert!(!cfg.outputs.case_change_map_png.exists());
        assert!(!cfg.outputs.correlation_png.exists());
        Ok(())
    }

    #[test]
    fn missing_input_is_fatal() {
        let tmp = tempdir().unwrap();
        let mut cfg = write_inputs(tmp.path(), "");
        cfg.inputs.population_2024_csv = tmp.path().join("nope.csv");
        assert!(run(&cfg).is_err());
        assert!(!cfg.outputs.population_map_png.exists());
    }

    #[test]
    fn full_run_writes_three_images() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let cfg = write_inputs(tmp.path(), "");
        let outcome = run(&cfg)?;
        assert_eq!(outcome.merged, 2);
        assert_eq!(outcome.population_map.summary.colored, 2);
        assert!(outcome.population_map.unmatched.is_empty());
        assert!(cfg.outputs.population_map_png.exists());
        assert!(cfg.outputs.case_change_map_png.exists());
        assert!(cfg.outputs.correlation_png.exists());
        assert_eq!(render::png_dimensions(&cfg.outputs.population_map_png)?, (640, 372));
        Ok(())
    }
}
