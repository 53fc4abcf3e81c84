use std::fmt;

/// Why a statistic has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedReason {
    /// Computed over zero valid samples.
    NoSamples,
    /// A correlation input has zero variance.
    ZeroVariance,
}

/// A numeric result that may be undefined. Undefined is never the same as 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Statistic {
    pub fn value(self) -> Option<f64> {
        match self {
            Statistic::Defined(v) => Some(v),
            Statistic::Undefined(_) => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Statistic::Defined(_))
    }
}

impl fmt::Display for Statistic {
    /// Honors the formatter's precision; undefined renders as "n/a".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Defined(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Statistic::Undefined(_) => f.write_str("n/a"),
        }
    }
}

/// Arithmetic mean.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Statistic {
    let (sum, n) = values
        .into_iter()
        .fold((0.0_f64, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        Statistic::Undefined(UndefinedReason::NoSamples)
    } else {
        Statistic::Defined(sum / n as f64)
    }
}

/// Pearson correlation over pairs; callers drop incomplete pairs first.
pub fn pearson(pairs: &[(f64, f64)]) -> Statistic {
    if pairs.is_empty() {
        return Statistic::Undefined(UndefinedReason::NoSamples);
    }
    let n = pairs.len() as f64;
    let (sx, sy) = pairs
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), &(x, y)| (sx + x, sy + y));
    let (mx, my) = (sx / n, sy / n);

    let (mut sxx, mut syy, mut sxy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for &(x, y) in pairs {
        let (dx, dy) = (x - mx, y - my);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return Statistic::Undefined(UndefinedReason::ZeroVariance);
    }
    // Rounding can push |r| a hair past 1.
    Statistic::Defined((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_nothing_is_undefined() {
        assert_eq!(mean([]), Statistic::Undefined(UndefinedReason::NoSamples));
        assert_eq!(mean([2.0, 4.0]), Statistic::Defined(3.0));
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let up = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        let down = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!((pearson(&up).value().unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&down).value().unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_is_symmetric() {
        let pairs = [(1.0, 7.5), (2.5, 3.0), (4.0, 9.0), (8.0, 1.0)];
        let swapped: Vec<(f64, f64)> = pairs.iter().map(|&(a, b)| (b, a)).collect();
        assert_eq!(pearson(&pairs), pearson(&swapped));
    }

    #[test]
    fn pearson_zero_variance_is_undefined() {
        let flat = [(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)];
        assert_eq!(
            pearson(&flat),
            Statistic::Undefined(UndefinedReason::ZeroVariance)
        );
        assert_eq!(
            pearson(&[]),
            Statistic::Undefined(UndefinedReason::NoSamples)
        );
    }

    #[test]
    fn display_respects_precision() {
        assert_eq!(format!("{:.2}", Statistic::Defined(0.12345)), "0.12");
        assert_eq!(
            format!("{:.2}", Statistic::Undefined(UndefinedReason::NoSamples)),
            "n/a"
        );
    }
}
