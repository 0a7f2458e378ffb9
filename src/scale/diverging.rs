use super::color::Rgb;

/// Piecewise-linear color ramp through ordered control points, clamped at both ends.
/// Used for the signed election margin: negative values lean Democratic,
/// positive values lean Republican, zero is neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct DivergingScale {
    stops: Vec<(f64, Rgb)>, // strictly increasing positions
    fallback: Rgb,
}

impl DivergingScale {
    /// Reference control points for the signed margin, in percentage points.
    pub const MARGIN_DOMAIN: [f64; 5] = [-40.0, -10.0, 0.0, 10.0, 40.0];

    /// Strong Democratic blue through neutral gray to strong Republican red.
    pub const MARGIN_COLORS: [Rgb; 5] = [
        Rgb::new(0x00, 0x15, 0xbc),
        Rgb::new(0x6b, 0x8d, 0xd6),
        Rgb::new(0xe8, 0xe8, 0xe8),
        Rgb::new(0xe5, 0x73, 0x73),
        Rgb::new(0xdc, 0x14, 0x3c),
    ];

    /// Pair positions with colors. Extra entries on either side are dropped.
    pub fn new(domain: &[f64], colors: &[Rgb], fallback: Rgb) -> Self {
        let stops = domain.iter().copied().zip(colors.iter().copied()).collect();
        Self { stops, fallback }
    }

    pub fn margin(fallback: Rgb) -> Self { Self::new(&Self::MARGIN_DOMAIN, &Self::MARGIN_COLORS, fallback) }

    #[inline]
    pub fn stops(&self) -> &[(f64, Rgb)] { &self.stops }

    #[inline]
    pub fn fallback(&self) -> Rgb { self.fallback }

    /// Outermost control points.
    pub fn domain(&self) -> Option<(f64, f64)> {
        Some((self.stops.first()?.0, self.stops.last()?.0))
    }

    pub fn range(&self) -> Vec<Rgb> { self.stops.iter().map(|&(_, c)| c).collect() }

    pub fn color(&self, value: f64) -> Rgb {
        let (Some(&(lo, lo_color)), Some(&(hi, hi_color))) = (self.stops.first(), self.stops.last()) else {
            return self.fallback;
        };
        if !value.is_finite() { return self.fallback }
        if value <= lo { return lo_color }
        if value >= hi { return hi_color }

        // First stop strictly above the value; the segment starts one before it.
        let upper = self.stops.partition_point(|&(p, _)| p <= value);
        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        c0.lerp(c1, (value - p0) / (p1 - p0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> DivergingScale { DivergingScale::margin(Rgb::UNKNOWN) }

    #[test]
    fn control_points_map_to_their_colors() {
        let scale = scale();
        for (position, color) in DivergingScale::MARGIN_DOMAIN.iter().zip(DivergingScale::MARGIN_COLORS) {
            assert_eq!(scale.color(*position), color);
        }
    }

    #[test]
    fn clamps_outside_outer_points() {
        let scale = scale();
        assert_eq!(scale.color(-95.0), DivergingScale::MARGIN_COLORS[0]);
        assert_eq!(scale.color(63.0), DivergingScale::MARGIN_COLORS[4]);
    }

    #[test]
    fn interpolates_between_adjacent_points() {
        let scale = scale();
        // Halfway between 0 (#e8e8e8) and +10 (#e57373).
        assert_eq!(scale.color(5.0), Rgb::new(0xe7, 0xae, 0xae));
        // Halfway between -40 (#0015bc) and -10 (#6b8dd6).
        assert_eq!(scale.color(-25.0), Rgb::new(0x36, 0x51, 0xc9));
    }

    #[test]
    fn domain_and_range() {
        let scale = scale();
        assert_eq!(scale.domain(), Some((-40.0, 40.0)));
        assert_eq!(scale.range(), DivergingScale::MARGIN_COLORS.to_vec());
    }

    #[test]
    fn empty_or_nan_uses_fallback() {
        let empty = DivergingScale::new(&[], &[], Rgb::UNKNOWN);
        assert_eq!(empty.color(3.0), Rgb::UNKNOWN);
        assert_eq!(empty.domain(), None);
        assert_eq!(scale().color(f64::NAN), Rgb::UNKNOWN);
    }
}
