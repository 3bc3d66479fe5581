use anyhow::{Context, Result};
use popcases::{config::PipelineConfig, report};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = match std::env::args_os().nth(1) {
        Some(path) => PipelineConfig::from_yaml_file(&path)
            .with_context(|| format!("loading config {}", path.to_string_lossy()))?,
        None => {
            info!("no config given; using defaults");
            PipelineConfig::default()
        }
    };

    // ─── 3) run + report ─────────────────────────────────────────────
    let outcome = popcases::run(&cfg)?;
    report::print_summary(&outcome);
    Ok(())
}
