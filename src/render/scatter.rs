// src/render/scatter.rs

use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

use super::ensure_parent_dir;
use crate::analysis::{Analysis, BandPoint};
use crate::config::ScatterConfig;

const BAND_STEPS: usize = 100;
const POINT: RGBColor = RGBColor(0x21, 0x71, 0xb5);
const FIT: RGBColor = RGBColor(0xcb, 0x18, 0x1d);

pub struct ScatterLabels<'a> {
    pub title: &'a str,
    pub x: &'a str,
    pub y: &'a str,
}

/// Axis range of `values` with 5 % padding; a point range is widened by 1.
pub fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return None;
    }
    if hi - lo == 0.0 {
        return Some((lo - 1.0, hi + 1.0));
    }
    let pad = (hi - lo) * 0.05;
    Some((lo - pad, hi + pad))
}

/// Closed outline of the band: upper edge left-to-right, lower edge back.
pub fn band_outline(band: &[BandPoint]) -> Vec<(f64, f64)> {
    band.iter()
        .map(|b| (b.x, b.upper))
        .chain(band.iter().rev().map(|b| (b.x, b.lower)))
        .collect()
}

/// Scatter of the analysed points with the OLS line and its 95 % band.
#[tracing::instrument(level = "info", skip_all, fields(path = %path.display(), points = analysis.points.len()))]
pub fn render_scatter(
    path: &Path,
    analysis: &Analysis,
    labels: &ScatterLabels<'_>,
    cfg: &ScatterConfig,
) -> Result<()> {
    ensure_parent_dir(path)?;

    let root = BitMapBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let title_px = (cfg.height / 30).max(12) as i32;
    let label_px = (cfg.height / 45).max(10) as i32;

    let x_range = padded_range(analysis.points.iter().map(|p| p.0));
    let y_range = padded_range(analysis.points.iter().map(|p| p.1));
    let (Some((x0, x1)), Some((y0, y1))) = (x_range, y_range) else {
        root.draw(&Text::new(
            "No data",
            ((cfg.width / 2) as i32, (cfg.height / 2) as i32),
            ("sans-serif", title_px).into_font().color(&BLACK),
        ))?;
        root.present()
            .with_context(|| format!("writing scatter plot to {}", path.display()))?;
        info!("no complete pairs; wrote empty scatter plot");
        return Ok(());
    };

    let caption = match analysis.correlation.r {
        Some(r) => format!("{} (r = {:.3}, n = {})", labels.title, r, analysis.correlation.used),
        None => format!("{} (r undefined)", labels.title),
    };

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .caption(caption, ("sans-serif", title_px))
        .x_label_area_size((cfg.height / 14) as i32)
        .y_label_area_size((cfg.width / 14) as i32)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(labels.x)
        .y_desc(labels.y)
        .label_style(("sans-serif", label_px))
        .axis_desc_style(("sans-serif", label_px))
        .draw()?;

    if let Some(reg) = &analysis.regression {
        let band = reg.band(x0, x1, BAND_STEPS);
        if !band.is_empty() {
            chart.draw_series(std::iter::once(Polygon::new(
                band_outline(&band),
                FIT.mix(0.2).filled(),
            )))?;
        }
        chart.draw_series(LineSeries::new(
            [(x0, reg.predict(x0)), (x1, reg.predict(x1))],
            FIT.stroke_width(3),
        ))?;
    }

    let radius = (cfg.width / 300).max(3) as i32;
    chart.draw_series(
        analysis
            .points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), radius, POINT.mix(0.7).filled())),
    )?;

    root.present()
        .with_context(|| format!("writing scatter plot to {}", path.display()))?;
    info!("scatter plot written");
    Ok(())
}
