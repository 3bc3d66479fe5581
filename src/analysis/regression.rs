// src/analysis/regression.rs

/// Two-sided 97.5 % Student-t quantiles for 1..=30 degrees of freedom.
const T_975: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

const Z_975: f64 = 1.959_963_984_540_054;

/// t(0.975, df); Cornish-Fisher expansion past the table.
pub fn t_quantile_975(df: usize) -> Option<f64> {
    match df {
        0 => None,
        1..=30 => Some(T_975[df - 1]),
        _ => {
            let z = Z_975;
            let v = df as f64;
            let z3 = z.powi(3);
            let z5 = z.powi(5);
            let z7 = z.powi(7);
            Some(
                z + (z3 + z) / (4.0 * v)
                    + (5.0 * z5 + 16.0 * z3 + 3.0 * z) / (96.0 * v * v)
                    + (3.0 * z7 + 19.0 * z5 + 17.0 * z3 - 15.0 * z) / (384.0 * v * v * v),
            )
        }
    }
}

/// Ordinary least squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub n: usize,
    mean_x: f64,
    sxx: f64,
    /// Residual standard error; needs at least three points.
    residual_se: Option<f64>,
}

/// One sample of the 95 % confidence band for the mean response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub x: f64,
    pub fit: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Regression {
    /// `None` for fewer than two points or a constant `x`.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| *x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| *y).sum::<f64>() / n;
        let (mut sxy, mut sxx) = (0.0, 0.0);
        for &(x, y) in points {
            let dx = x - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }
        if sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let residual_se = (points.len() > 2).then(|| {
            let sse: f64 = points
                .iter()
                .map(|&(x, y)| {
                    let r = y - (intercept + slope * x);
                    r * r
                })
                .sum();
            (sse / (n - 2.0)).sqrt()
        });

        Some(Self {
            slope,
            intercept,
            n: points.len(),
            mean_x,
            sxx,
            residual_se,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// 95 % confidence interval of the fitted mean at `x`.
    pub fn confidence_interval(&self, x: f64) -> Option<(f64, f64)> {
        let se = self.residual_se?;
        let t = t_quantile_975(self.n - 2)?;
        let n = self.n as f64;
        let dx = x - self.mean_x;
        let half = t * se * (1.0 / n + dx * dx / self.sxx).sqrt();
        let fit = self.predict(x);
        Some((fit - half, fit + half))
    }

    /// `steps + 1` evenly spaced band samples across `[x_min, x_max]`.
    pub fn band(&self, x_min: f64, x_max: f64, steps: usize) -> Vec<BandPoint> {
        let steps = steps.max(1);
        (0..=steps)
            .filter_map(|i| {
                let x = x_min + (x_max - x_min) * i as f64 / steps as f64;
                let (lower, upper) = self.confidence_interval(x)?;
                Some(BandPoint {
                    x,
                    fit: self.predict(x),
                    lower,
                    upper,
                })
            })
            .collect()
    }
}
