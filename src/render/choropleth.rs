// src/render/choropleth.rs

use anyhow::{Context, Result};
use plotters::prelude::*;
use std::{collections::HashMap, path::Path};
use tracing::info;

use super::bins::{palette, FixedWidthBins, NO_DATA};
use super::{ensure_parent_dir, format_count};
use crate::analysis::JoinResult;
use crate::config::MapConfig;
use crate::geo::{ShapeValue, WorldGeometry};

/// Equirectangular extent; Antarctica is cropped.
const LON_RANGE: std::ops::Range<f64> = -180.0..180.0;
const LAT_RANGE: std::ops::Range<f64> = -60.0..85.0;

const OCEAN: RGBColor = WHITE;
const BORDER: RGBColor = RGBColor(0x60, 0x60, 0x60);

/// How legend boundaries are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendScale {
    /// Values are raw; print as-is.
    Linear,
    /// Values are `ln(1 + x)`; print `x`.
    Log1p,
}

impl LegendScale {
    pub fn label(&self, lo: f64, hi: f64) -> String {
        let (lo, hi) = match self {
            LegendScale::Linear => (lo, hi),
            LegendScale::Log1p => (lo.exp_m1(), hi.exp_m1()),
        };
        format!("{} - {}", format_count(lo), format_count(hi))
    }
}

#[derive(Debug, Clone)]
pub struct ChoroplethStyle<'a> {
    pub title: &'a str,
    pub legend_title: &'a str,
    pub scale: LegendScale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethSummary {
    pub colored: usize,
    pub no_data: usize,
    pub bins: Option<FixedWidthBins>,
}

/// Pixel rectangle of one legend swatch and where its label starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendSlot {
    pub top_left: (i32, i32),
    pub bottom_right: (i32, i32),
    pub label_at: (i32, i32),
}

/// Stack `entries` swatches upward from the lower-left corner.
pub fn legend_layout(width: u32, height: u32, entries: usize) -> Vec<LegendSlot> {
    let (w, h) = (width as i32, height as i32);
    let swatch_w = (w / 40).max(8);
    let swatch_h = (h / 45).max(6);
    let gap = swatch_h / 4;
    let left = w / 30;
    let bottom = h - h / 12;

    (0..entries)
        .map(|i| {
            let y1 = bottom - i as i32 * (swatch_h + gap);
            let y0 = y1 - swatch_h;
            LegendSlot {
                top_left: (left, y0),
                bottom_right: (left + swatch_w, y1),
                label_at: (left + swatch_w + swatch_w / 3, y0 + swatch_h / 6),
            }
        })
        .collect()
}

/// Colour each joined shape by its fixed-width bin and write a PNG.
/// Shapes without data, or with a non-finite value, are drawn grey.
#[tracing::instrument(level = "info", skip_all, fields(path = %path.display(), title = style.title))]
pub fn render_choropleth(
    path: &Path,
    world: &WorldGeometry,
    joined: &JoinResult<ShapeValue<'_>, String>,
    style: &ChoroplethStyle<'_>,
    cfg: &MapConfig,
) -> Result<ChoroplethSummary> {
    ensure_parent_dir(path)?;

    let bins = FixedWidthBins::from_values(joined.matched.iter().map(|m| m.value), cfg.bins);
    let colors = palette(cfg.bins);
    let fill: HashMap<&str, RGBColor> = match &bins {
        Some(b) => joined
            .matched
            .iter()
            .filter_map(|m| Some((m.shape.name.as_str(), colors[b.bin_of(m.value)?])))
            .collect(),
        None => HashMap::new(),
    };

    {
        let root = BitMapBackend::new(path, (cfg.width, cfg.height)).into_drawing_area();
        root.fill(&OCEAN)?;

        let title_px = (cfg.height / 30).max(12) as i32;
        let mut chart = ChartBuilder::on(&root)
            .margin((cfg.height / 60) as i32)
            .caption(style.title, ("sans-serif", title_px))
            .build_cartesian_2d(LON_RANGE, LAT_RANGE)?;

        let stroke = (cfg.width / 2000).max(1);
        for shape in &world.shapes {
            let color = fill.get(shape.name.as_str()).copied().unwrap_or(NO_DATA);
            for polygon in &shape.polygons {
                let mut rings = polygon.rings.iter();
                if let Some(outer) = rings.next() {
                    chart.draw_series(std::iter::once(Polygon::new(
                        outer.clone(),
                        color.filled(),
                    )))?;
                }
                chart.draw_series(rings.map(|hole| Polygon::new(hole.clone(), OCEAN.filled())))?;
                chart.draw_series(polygon.rings.iter().map(|ring| {
                    PathElement::new(ring.clone(), BORDER.stroke_width(stroke))
                }))?;
            }
        }

        // legend: bins bottom-up, "no data" on top, title above that
        let entries = bins.map(|b| b.count).unwrap_or(0) + 1;
        let slots = legend_layout(cfg.width, cfg.height, entries + 1);
        let label_px = (cfg.height / 70).max(10) as i32;
        let font = ("sans-serif", label_px).into_font().color(&BLACK);

        if let Some(b) = &bins {
            let edges = b.edges();
            for (i, slot) in slots.iter().take(b.count).enumerate() {
                root.draw(&Rectangle::new(
                    [slot.top_left, slot.bottom_right],
                    colors[i].filled(),
                ))?;
                root.draw(&Rectangle::new(
                    [slot.top_left, slot.bottom_right],
                    BORDER.stroke_width(1),
                ))?;
                root.draw(&Text::new(
                    style.scale.label(edges[i], edges[i + 1]),
                    slot.label_at,
                    font.clone(),
                ))?;
            }
        }
        let no_data_slot = slots[entries - 1];
        root.draw(&Rectangle::new(
            [no_data_slot.top_left, no_data_slot.bottom_right],
            NO_DATA.filled(),
        ))?;
        root.draw(&Text::new("No data", no_data_slot.label_at, font.clone()))?;

        let title_slot = slots[entries];
        root.draw(&Text::new(
            style.legend_title,
            title_slot.top_left,
            ("sans-serif", label_px).into_font().style(FontStyle::Bold).color(&BLACK),
        ))?;

        root.present()
            .with_context(|| format!("writing choropleth to {}", path.display()))?;
    }

    let colored = world
        .shapes
        .iter()
        .filter(|s| fill.contains_key(s.name.as_str()))
        .count();
    let summary = ChoroplethSummary {
        colored,
        no_data: world.shapes.len() - colored,
        bins,
    };
    info!(
        colored = summary.colored,
        no_data = summary.no_data,
        "choropleth written"
    );
    Ok(summary)
}
