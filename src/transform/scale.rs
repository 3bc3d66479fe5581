/// `ln(x + 1)`; finite and ≥ 0 for every x ≥ 0, NaN below -1.
#[inline]
pub fn log1p(x: f64) -> f64 {
    x.ln_1p()
}
