pub mod bins;
pub mod choropleth;
pub mod scatter;

pub use bins::{palette, FixedWidthBins, BLUES_7, NO_DATA};
pub use choropleth::{render_choropleth, ChoroplethStyle, ChoroplethSummary, LegendScale};
pub use scatter::{render_scatter, ScatterLabels};

use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Create the directory an output file will be written into.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display())),
        _ => Ok(()),
    }
}

/// Short human count: `950`, `12.5k`, `3.1M`, `1.4B`.
pub fn format_count(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

/// Width and height from a PNG's IHDR chunk.
#[cfg(test)]
pub(crate) fn png_dimensions(path: &Path) -> Result<(u32, u32)> {
    let bytes = fs::read(path)?;
    anyhow::ensure!(
        bytes.len() >= 24 && bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "{} is not a PNG",
        path.display()
    );
    let be = |at: usize| u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    Ok((be(16), be(20)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn formats_counts() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(950.0), "950");
        assert_eq!(format_count(2.3), "2.3");
        assert_eq!(format_count(12_500.0), "12.5k");
        assert_eq!(format_count(3_100_000.0), "3.1M");
        assert_eq!(format_count(1.4e9), "1.4B");
    }

    #[test]
    fn creates_missing_parent() {
        let tmp = tempdir().unwrap();
        let out = tmp.path().join("a/b/c.png");
        ensure_parent_dir(&out).unwrap();
        assert!(tmp.path().join("a/b").is_dir());
        ensure_parent_dir(Path::new("bare.png")).unwrap();
    }
}
