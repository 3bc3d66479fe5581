// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};

/// Everything the pipeline reads, writes and tunes. Each stage receives the
/// section it needs; nothing is looked up from globals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
    pub map: MapConfig,
    pub scatter: ScatterConfig,
    pub analysis: AnalysisConfig,
    /// Extra `data name -> geometry name` substitutions, merged over the built-ins.
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    /// Columns `Country, Date, Cases, …`
    pub cases_csv: PathBuf,
    /// Columns `Country, Year, pop`
    pub population_by_year_csv: PathBuf,
    /// Columns `country, pop2024`
    pub population_2024_csv: PathBuf,
    /// GeoJSON FeatureCollection of country polygons
    pub world_geojson: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub population_map_png: PathBuf,
    pub case_change_map_png: PathBuf,
    pub correlation_png: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: u32,
    pub height: u32,
    pub bins: usize,
    /// GeoJSON feature property that holds the country name.
    pub name_property: String,
    /// Abort instead of warning when a data country has no polygon.
    pub fail_on_unmatched: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Inclusive year window summed for the case-change map.
    pub case_change_from: i32,
    pub case_change_to: i32,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            cases_csv: PathBuf::from("data/covid_cases.csv"),
            population_by_year_csv: PathBuf::from("data/population_by_year.csv"),
            population_2024_csv: PathBuf::from("data/population_2024.csv"),
            world_geojson: PathBuf::from("data/world.geojson"),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            population_map_png: PathBuf::from("output/population_map.png"),
            case_change_map_png: PathBuf::from("output/case_change_map_2023_2024.png"),
            correlation_png: PathBuf::from("output/population_vs_case_change.png"),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 3200,
            height: 1860,
            bins: 7,
            name_property: "ADMIN".to_string(),
            fail_on_unmatched: false,
        }
    }
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            width: 1800,
            height: 1400,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            case_change_from: 2023,
            case_change_to: 2024,
        }
    }
}

impl PipelineConfig {
    /// Read a YAML config; missing keys fall back to the defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let cfg: Self = serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.map.bins == 0 {
            bail!("map.bins must be at least 1");
        }
        if self.map.width == 0 || self.map.height == 0 {
            bail!(
                "map size must be non-zero, got {}x{}",
                self.map.width,
                self.map.height
            );
        }
        if self.scatter.width == 0 || self.scatter.height == 0 {
            bail!(
                "scatter size must be non-zero, got {}x{}",
                self.scatter.width,
                self.scatter.height
            );
        }
        if self.analysis.case_change_from > self.analysis.case_change_to {
            bail!(
                "analysis window is empty: {} > {}",
                self.analysis.case_change_from,
                self.analysis.case_change_to
            );
        }
        Ok(())
    }
}
