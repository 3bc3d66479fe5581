// src/load/mod.rs
pub mod date_parser;
pub mod utils;

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use csv::{ReaderBuilder, Trim};
use serde::{de::DeserializeOwned, Deserialize};
use std::{fs::File, path::Path};
use tracing::{debug, info};

use crate::transform::PopulationRecord;
use utils::parse_number;

/// One row of the COVID file after date parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseObservation {
    pub country: String,
    pub date: NaiveDate,
    pub year: i32,
    /// `None` when the cell was blank.
    pub cases: Option<f64>,
}

/// One row of the per-year population file.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationYear {
    pub country: String,
    pub year: i32,
    pub population: f64,
}

#[derive(Debug, Deserialize)]
struct CaseRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Cases")]
    cases: String,
}

#[derive(Debug, Deserialize)]
struct PopulationYearRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Year")]
    year: String,
    pop: String,
}

#[derive(Debug, Deserialize)]
struct Population2024Row {
    country: String,
    pop2024: String,
}

/// Deserialize every record of `path` into `T`; errors name the file and
/// the record index. Unknown columns are ignored.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<T>().enumerate() {
        let row = result.with_context(|| {
            format!("CSV parse error in {} at record {}", path.display(), idx)
        })?;
        rows.push(row);
    }
    debug!(path = %path.display(), rows = rows.len(), "read csv");
    Ok(rows)
}

fn required_number(raw: &str, column: &str, path: &Path, idx: usize) -> Result<f64> {
    match parse_number(raw) {
        Some(Ok(v)) => Ok(v),
        Some(Err(e)) => Err(anyhow!(
            "{}: record {} has non-numeric {} `{}`: {}",
            path.display(),
            idx,
            column,
            raw,
            e
        )),
        None => Err(anyhow!(
            "{}: record {} is missing {}",
            path.display(),
            idx,
            column
        )),
    }
}

/// Load the COVID case file (`Country, Date, Cases, …`).
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<CaseObservation>> {
    let path = path.as_ref();
    let rows: Vec<CaseRow> = read_rows(path)?;

    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let date = date_parser::parse_date(&row.date).ok_or_else(|| {
            anyhow!(
                "{}: record {} has unparsable Date `{}`",
                path.display(),
                idx,
                row.date
            )
        })?;
        let cases = match parse_number(&row.cases) {
            Some(Ok(v)) => Some(v),
            Some(Err(e)) => {
                return Err(anyhow!(
                    "{}: record {} has non-numeric Cases `{}`: {}",
                    path.display(),
                    idx,
                    row.cases,
                    e
                ))
            }
            None => None,
        };
        out.push(CaseObservation {
            country: row.country,
            date,
            year: date.year(),
            cases,
        });
    }

    info!(rows = out.len(), "loaded case observations");
    Ok(out)
}

/// Load population by year (`Country, Year, pop`).
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_population_by_year<P: AsRef<Path>>(path: P) -> Result<Vec<PopulationYear>> {
    let path = path.as_ref();
    let rows: Vec<PopulationYearRow> = read_rows(path)?;

    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let year = row.year.parse::<i32>().with_context(|| {
            format!(
                "{}: record {} has invalid Year `{}`",
                path.display(),
                idx,
                row.year
            )
        })?;
        out.push(PopulationYear {
            country: row.country,
            year,
            population: required_number(&row.pop, "pop", path, idx)?,
        });
    }

    info!(rows = out.len(), "loaded population by year");
    Ok(out)
}

/// Load the 2024 population snapshot (`country, pop2024`).
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_population_2024<P: AsRef<Path>>(path: P) -> Result<Vec<PopulationRecord>> {
    let path = path.as_ref();
    let rows: Vec<Population2024Row> = read_rows(path)?;

    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let pop = required_number(&row.pop2024, "pop2024", path, idx)?;
        out.push(PopulationRecord::new(row.country, pop));
    }

    info!(rows = out.len(), "loaded 2024 population");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};
    use tempfile::{tempdir, TempDir};
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,popcases::load=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_cases() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let path = write_csv(
            &tmp,
            "cases.csv",
            "Country,Date,Cases,Deaths\n\
             X,2023-01-01,10,0\n\
             \"DR Congo\",2023/12/31,\"1,500\",3\n\
             X,2024-06-30,,1\n",
        );

        let rows = load_cases(&path)?;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].country, "X");
        assert_eq!(rows[0].year, 2023);
        assert_eq!(rows[0].cases, Some(10.0));
        assert_eq!(rows[1].country, "DR Congo");
        assert_eq!(rows[1].cases, Some(1500.0));
        assert_eq!(rows[2].year, 2024);
        assert_eq!(rows[2].cases, None);
        Ok(())
    }

    #[test]
    fn test_load_cases_na_is_missing_not_fatal() -> Result<()> {
        init_test_logging();
        let tmp = tempdir()?;
        let path = write_csv(
            &tmp,
            "cases.csv",
            "Country,Date,Cases\nX,2023-01-01,NA\nX,2023-02-01,N/A\nX,2023-03-01,7\n",
        );
        let rows = load_cases(&path)?;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cases, None);
        assert_eq!(rows[1].cases, None);
        assert_eq!(rows[2].cases, Some(7.0));
        Ok(())
    }

    #[test]
    fn test_load_cases_bad_date_is_fatal() -> Result<()> {
        let tmp = tempdir()?;
        let path = write_csv(&tmp, "cases.csv", "Country,Date,Cases\nX,someday,1\n");
        let err = load_cases(&path).unwrap_err();
        assert!(err.to_string().contains("record 0"), "{err}");
        Ok(())
    }

    #[test]
    fn test_load_cases_missing_column_is_fatal() -> Result<()> {
        let tmp = tempdir()?;
        let path = write_csv(&tmp, "cases.csv", "Country,When,Cases\nX,2023-01-01,1\n");
        assert!(load_cases(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_population_by_year("/definitely/not/here.csv").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open CSV file"));
    }

    #[test]
    fn test_load_population_by_year() -> Result<()> {
        let tmp = tempdir()?;
        let path = write_csv(
            &tmp,
            "pop.csv",
            "Country,Year,pop\nX,2023,100\nY,2024,2.5e6\n",
        );
        let rows = load_population_by_year(&path)?;
        assert_eq!(
            rows,
            vec![
                PopulationYear {
                    country: "X".into(),
                    year: 2023,
                    population: 100.0
                },
                PopulationYear {
                    country: "Y".into(),
                    year: 2024,
                    population: 2.5e6
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_load_population_by_year_rejects_text_pop() -> Result<()> {
        let tmp = tempdir()?;
        let path = write_csv(&tmp, "pop.csv", "Country,Year,pop\nX,2023,lots\n");
        let err = load_population_by_year(&path).unwrap_err();
        assert!(err.to_string().contains("non-numeric pop"), "{err}");
        Ok(())
    }

    #[test]
    fn test_load_population_2024() -> Result<()> {
        let tmp = tempdir()?;
        let path = write_csv(&tmp, "pop24.csv", "country,pop2024\nX,0\nY,99\n");
        let rows = load_population_2024(&path)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].log_population, 0.0);
        assert!((rows[1].log_population - 100f64.ln()).abs() < 1e-12);
        Ok(())
    }
}
