use super::color::Rgb;

/// Equal-width bucketing of a continuous domain onto a fixed palette.
///
/// `[min, max]` is split into `range.len()` buckets of width `(max - min) / k`.
/// A value exactly on an inner boundary belongs to the upper bucket, and values
/// outside the domain clamp to the first or last bucket. A domain with
/// `min == max` sends every value to the last color; a scale built from no
/// values at all has no domain and answers the fallback color.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeScale {
    domain: Option<(f64, f64)>,
    range: Vec<Rgb>,
    fallback: Rgb,
}

impl QuantizeScale {
    /// Build over the observed values. Non-finite values are ignored; the
    /// min/max reduction does not depend on iteration order.
    pub fn from_values(values: impl IntoIterator<Item = f64>, range: Vec<Rgb>, fallback: Rgb) -> Self {
        let domain = values.into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            });
        Self::new(domain, range, fallback)
    }

    pub fn new(domain: Option<(f64, f64)>, range: Vec<Rgb>, fallback: Rgb) -> Self {
        let domain = domain.map(|(a, b)| if a <= b { (a, b) } else { (b, a) });
        Self { domain, range, fallback }
    }

    #[inline]
    pub fn domain(&self) -> Option<(f64, f64)> { self.domain }

    #[inline]
    pub fn range(&self) -> &[Rgb] { &self.range }

    #[inline]
    pub fn fallback(&self) -> Rgb { self.fallback }

    /// True when every value lands in a single bucket (no spread, or no values).
    pub fn is_degenerate(&self) -> bool {
        self.domain.is_none_or(|(lo, hi)| lo == hi)
    }

    /// Inner bucket boundaries, `k - 1` of them.
    pub fn thresholds(&self) -> Vec<f64> {
        let Some((lo, hi)) = self.domain else { return Vec::new() };
        let k = self.range.len();
        (1..k).map(|i| lo + (hi - lo) * i as f64 / k as f64).collect()
    }

    /// Bucket index for a value, or `None` when the scale cannot place it.
    pub fn bucket(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || self.range.is_empty() || self.domain.is_none() { return None }
        Some(self.thresholds().partition_point(|&t| t <= value))
    }

    pub fn color(&self, value: f64) -> Rgb {
        self.bucket(value).map(|i| self.range[i]).unwrap_or(self.fallback)
    }

    /// Color for an optional value; absent values get the fallback.
    pub fn color_or_fallback(&self, value: Option<f64>) -> Rgb {
        value.map(|v| self.color(v)).unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const GREEN: Rgb = Rgb::new(0, 255, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn five() -> Vec<Rgb> { (0..5).map(|i| Rgb::new(i * 50, 0, 0)).collect() }

    #[test]
    fn two_color_scale_boundary_goes_up() {
        let scale = QuantizeScale::from_values([100.0, 200.0, 300.0], vec![RED, BLUE], Rgb::UNKNOWN);
        assert_eq!(scale.domain(), Some((100.0, 300.0)));
        assert_eq!(scale.thresholds(), vec![200.0]);
        assert_eq!(scale.color(100.0), RED);
        assert_eq!(scale.color(199.999), RED);
        assert_eq!(scale.color(200.0), BLUE);
        assert_eq!(scale.color(300.0), BLUE);
    }

    #[test]
    fn out_of_domain_values_clamp() {
        let scale = QuantizeScale::from_values([0.0, 10.0], vec![RED, GREEN, BLUE], Rgb::UNKNOWN);
        assert_eq!(scale.color(-1e9), RED);
        assert_eq!(scale.color(1e9), BLUE);
    }

    #[test]
    fn buckets_are_monotonic() {
        let scale = QuantizeScale::from_values([3.0, 17.5, 42.0, 8.25], five(), Rgb::UNKNOWN);
        let mut previous = 0;
        for step in 0..=400 {
            let value = step as f64 * 0.125 - 5.0;
            let bucket = scale.bucket(value).unwrap();
            assert!(bucket >= previous, "bucket decreased at {value}");
            previous = bucket;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn domain_is_order_independent() {
        let values = [5.0, -2.0, 9.5, 0.0, 9.5, 3.0];
        let forward = QuantizeScale::from_values(values, five(), Rgb::UNKNOWN);
        let backward = QuantizeScale::from_values(values.iter().rev().copied(), five(), Rgb::UNKNOWN);
        assert_eq!(forward, backward);
        assert_eq!(forward.domain(), Some((-2.0, 9.5)));
    }

    #[test]
    fn constant_domain_is_single_bucket() {
        let scale = QuantizeScale::from_values([7.0, 7.0, 7.0], five(), Rgb::UNKNOWN);
        assert!(scale.is_degenerate());
        assert_eq!(scale.color(7.0), five()[4]);
        assert_eq!(scale.color(6.0), five()[0]);
    }

    #[test]
    fn empty_domain_uses_fallback() {
        let scale = QuantizeScale::from_values(std::iter::empty(), five(), Rgb::UNKNOWN);
        assert!(scale.is_degenerate());
        assert_eq!(scale.domain(), None);
        assert_eq!(scale.color(1.0), Rgb::UNKNOWN);
        assert!(scale.thresholds().is_empty());
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let scale = QuantizeScale::from_values([f64::NAN, 1.0, f64::INFINITY, 3.0], vec![RED, BLUE], Rgb::UNKNOWN);
        assert_eq!(scale.domain(), Some((1.0, 3.0)));
        assert_eq!(scale.color(f64::NAN), Rgb::UNKNOWN);
        assert_eq!(scale.color_or_fallback(None), Rgb::UNKNOWN);
    }

    #[test]
    fn empty_palette_uses_fallback() {
        let scale = QuantizeScale::from_values([1.0, 2.0], Vec::new(), Rgb::UNKNOWN);
        assert_eq!(scale.color(1.5), Rgb::UNKNOWN);
    }
}
