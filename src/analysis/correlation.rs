/// Pearson r over the complete pairs only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationSummary {
    /// `None` with fewer than two usable pairs or zero variance on a side.
    pub r: Option<f64>,
    pub used: usize,
    /// Pairs with a missing or non-finite value on either side.
    pub excluded: usize,
}

/// Pairwise-complete Pearson correlation.
pub fn pearson<I>(pairs: I) -> CorrelationSummary
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut excluded = 0;
    for pair in pairs {
        match pair {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                xs.push(x);
                ys.push(y);
            }
            _ => excluded += 1,
        }
    }

    CorrelationSummary {
        r: pearson_complete(&xs, &ys),
        used: xs.len(),
        excluded,
    }
}

fn pearson_complete(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let (mut num, mut denom_x, mut denom_y) = (0.0, 0.0, 0.0);
    for (&xx, &yy) in x.iter().zip(y.iter()) {
        let dx = xx - mean_x;
        let dy = yy - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }
    let denom = denom_x.sqrt() * denom_y.sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((num / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pearson_columns(x: &[f64], y: &[f64]) -> CorrelationSummary {
        pearson(x.iter().zip(y).map(|(&a, &b)| (Some(a), Some(b))))
    }

    #[test]
    fn perfect_linear_relationships() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson_columns(&x, &up).r.unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson_columns(&x, &down).r.unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_in_its_arguments() {
        let x = [3.1, 0.2, 9.9, 4.4, 7.0, 1.5];
        let y = [1.0, 0.7, 5.5, 2.2, 2.0, 8.1];
        let xy = pearson_columns(&x, &y);
        let yx = pearson_columns(&y, &x);
        assert_eq!(xy.r, yx.r);
        assert!(xy.r.unwrap().abs() <= 1.0);
    }

    #[test]
    fn incomplete_pairs_are_excluded_not_propagated() {
        let pairs = vec![
            (Some(1.0), Some(1.0)),
            (Some(2.0), None),
            (None, Some(9.0)),
            (Some(3.0), Some(3.0)),
            (Some(f64::NAN), Some(4.0)),
            (Some(5.0), Some(5.0)),
        ];
        let s = pearson(pairs);
        assert_eq!(s.used, 3);
        assert_eq!(s.excluded, 3);
        assert!((s.r.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_without_enough_data_or_variance() {
        assert_eq!(pearson_columns(&[], &[]).r, None);
        assert_eq!(pearson_columns(&[1.0], &[2.0]).r, None);
        assert_eq!(pearson_columns(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).r, None);
    }
}
