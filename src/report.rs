// src/report.rs

use prettytable::{format, Cell, Row, Table};
use std::fmt::Display;

use crate::analysis::JoinResult;
use crate::geo::ShapeValue;
use crate::pipeline::{MapOutcome, PipelineOutcome};

fn header(cells: &[&str]) -> Row {
    Row::new(cells.iter().map(|c| Cell::new(c).style_spec("bFg")).collect())
}

fn kv(table: &mut Table, key: &str, value: impl Display) {
    table.add_row(Row::new(vec![
        Cell::new(key),
        Cell::new(&value.to_string()).style_spec("r"),
    ]));
}

fn map_rows(table: &mut Table, label: &str, map: &MapOutcome) {
    kv(table, &format!("{label}: coloured"), map.summary.colored);
    kv(table, &format!("{label}: no data"), map.summary.no_data);
    kv(table, &format!("{label}: unmatched"), map.unmatched.len());
    kv(table, &format!("{label}: file"), map.path.display());
}

/// One-row-per-metric summary of a finished run.
pub fn summary_table(outcome: &PipelineOutcome) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(header(&["Metric", "Value"]));

    kv(&mut table, "case rows", outcome.case_rows);
    kv(&mut table, "population-by-year rows", outcome.population_by_year_rows);
    kv(&mut table, "population 2024 rows", outcome.population_2024_rows);
    kv(&mut table, "names normalized", outcome.renamed);
    kv(&mut table, "case rows without a count", outcome.missing_cases);
    kv(&mut table, "collapsed population rows", outcome.population_duplicates);
    kv(&mut table, "country-years", outcome.country_years);

    map_rows(&mut table, "population map", &outcome.population_map);
    map_rows(&mut table, "case-change map", &outcome.case_change_map);

    kv(&mut table, "merged country-years", outcome.merged);
    kv(&mut table, "population only", outcome.population_only.len());
    kv(&mut table, "cases only", outcome.cases_only.len());

    let corr = &outcome.analysis.correlation;
    match corr.r {
        Some(r) => kv(&mut table, "pearson r", format!("{r:.4}")),
        None => kv(&mut table, "pearson r", "undefined"),
    }
    kv(&mut table, "pairs used", corr.used);
    kv(&mut table, "pairs excluded", corr.excluded);
    if let Some(reg) = &outcome.analysis.regression {
        kv(&mut table, "slope", format!("{:.4}", reg.slope));
        kv(&mut table, "intercept", format!("{:.4}", reg.intercept));
    }
    kv(&mut table, "correlation plot", outcome.correlation_path.display());
    table
}

/// Two-column listing of names that found no partner.
pub fn unmatched_table<'a, I>(stage: &str, names: I) -> Table
where
    I: IntoIterator<Item = &'a String>,
{
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(header(&["Stage", "Country"]));
    for name in names {
        table.add_row(Row::new(vec![Cell::new(stage), Cell::new(name)]));
    }
    table
}

/// Per map: shapes coloured, data countries without a shape, and
/// geometry features left without data.
pub fn map_coverage_table(maps: &[(&str, &JoinResult<ShapeValue<'_>, String>)]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(header(&[
        "Map",
        "Matched",
        "Data without shape",
        "Features without data",
    ]));
    for (label, joined) in maps {
        table.add_row(Row::new(vec![
            Cell::new(label),
            Cell::new(&joined.matched.len().to_string()).style_spec("r"),
            Cell::new(&joined.unmatched_left.len().to_string()).style_spec("r"),
            Cell::new(&joined.unmatched_right.len().to_string()).style_spec("r"),
        ]));
    }
    table
}

pub fn print_summary(outcome: &PipelineOutcome) {
    println!("\n--- Pipeline Summary ---");
    summary_table(outcome).printstd();
}
