// src/render/bins.rs

use plotters::style::RGBColor;

/// Sequential light-to-dark blue ramp.
pub const BLUES_7: [RGBColor; 7] = [
    RGBColor(0xef, 0xf3, 0xff),
    RGBColor(0xc6, 0xdb, 0xef),
    RGBColor(0x9e, 0xca, 0xe1),
    RGBColor(0x6b, 0xae, 0xd6),
    RGBColor(0x42, 0x92, 0xc6),
    RGBColor(0x21, 0x71, 0xb5),
    RGBColor(0x08, 0x45, 0x94),
];

pub const NO_DATA: RGBColor = RGBColor(0xd9, 0xd9, 0xd9);

/// `n` colours along [`BLUES_7`]; exactly the ramp when `n == 7`.
pub fn palette(n: usize) -> Vec<RGBColor> {
    match n {
        0 => Vec::new(),
        1 => vec![BLUES_7[BLUES_7.len() / 2]],
        _ => (0..n)
            .map(|i| {
                let t = i as f64 / (n - 1) as f64 * (BLUES_7.len() - 1) as f64;
                let lo = t.floor() as usize;
                let hi = (lo + 1).min(BLUES_7.len() - 1);
                let f = t - lo as f64;
                let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
                let (a, b) = (BLUES_7[lo], BLUES_7[hi]);
                RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
            })
            .collect(),
    }
}

/// Equal-width intervals over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthBins {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl FixedWidthBins {
    /// Range of the finite values; `None` when there are none.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I, count: usize) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        (min.is_finite() && count > 0).then_some(Self { min, max, count })
    }

    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.count as f64
    }

    /// Bin index of `v`; the maximum lands in the last bin, values outside
    /// the range are clamped, a zero-width range maps everything to bin 0.
    /// Non-finite values have no bin.
    pub fn bin_of(&self, v: f64) -> Option<usize> {
        if !v.is_finite() {
            return None;
        }
        let width = self.width();
        if width <= 0.0 {
            return Some(0);
        }
        let idx = ((v - self.min) / width).floor();
        if idx < 0.0 {
            Some(0)
        } else {
            Some((idx as usize).min(self.count - 1))
        }
    }

    /// `count + 1` boundaries from `min` to `max`.
    pub fn edges(&self) -> Vec<f64> {
        let width = self.width();
        (0..=self.count)
            .map(|i| {
                if i == self.count {
                    self.max
                } else {
                    self.min + width * i as f64
                }
            })
            .collect()
    }
}
