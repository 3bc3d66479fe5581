use anyhow::Result;
use popcases::{
    analysis::merge_population_cases,
    config::PipelineConfig,
    pipeline::{case_change_map_values, load_inputs, population_map_values, prepare},
    report::{map_coverage_table, unmatched_table},
    transform::AliasTable,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Lists every name that would be dropped by a join, without rendering anything.
fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match std::env::args_os().nth(1) {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    cfg.validate()?;
    let aliases = AliasTable::with_extra(&cfg.aliases)?;

    let inputs = load_inputs(&cfg)?;
    let world = inputs.world;
    let prepared = prepare(
        &aliases,
        inputs.cases,
        inputs.population_by_year,
        inputs.population_2024,
    );

    let population = world.join(population_map_values(&prepared.population_2024));
    let (from, to) = (cfg.analysis.case_change_from, cfg.analysis.case_change_to);
    let cases = world.join(case_change_map_values(&prepared, from, to));
    let merged = merge_population_cases(&prepared.population_by_year, &prepared.cases.years);
    let merge_misses: Vec<String> = merged
        .unmatched_right
        .iter()
        .map(|(country, year)| format!("{country} ({year})"))
        .collect();

    println!("\n--- Map coverage ---");
    map_coverage_table(&[("population map", &population), ("case-change map", &cases)]).printstd();

    let sections = [
        ("population map", &population.unmatched_left),
        ("case-change map", &cases.unmatched_left),
        ("merge: cases without population", &merge_misses),
    ];

    let mut total = 0;
    for (stage, names) in sections {
        if names.is_empty() {
            println!("{stage}: every name matched");
            continue;
        }
        total += names.len();
        println!("\n--- {stage}: {} unmatched ---", names.len());
        unmatched_table(stage, names.iter()).printstd();
    }

    tracing::info!(total, "unmatched scan finished");
    Ok(())
}
