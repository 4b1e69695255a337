use fixed::types::extra::U20;

/// Signed fixed number with the low 20 bits representing fraction. TFM and
/// VF files store dimensions relative to the design size in this format
pub type FixWord = fixed::FixedI32<U20>;

/// Points per inch, as TeX measures them
pub const POINTS_PER_INCH: f64 = 72.27;

/// `2^20`, the scale of a [FixWord]
pub const FIX_UNITY: f64 = (1 << 20) as f64;

/// Handle to a physical font opened through a
/// [PhysicalFontOpener](crate::provider::PhysicalFontOpener)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

/// Interprets a raw fix_word as a real number
pub fn fix_to_f64(raw: i32) -> f64 {
    FixWord::from_bits(raw).to_num::<f64>()
}

/// Pixels per point at the given resolution and magnification
pub fn pixels_per_point(dpi: f64, mag: f64) -> f64 {
    dpi * mag / POINTS_PER_INCH
}

/// Rounds half away from zero
pub fn round_to_int(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fix_word_unity() {
        assert_eq!(fix_to_f64(1 << 20), 1.0);
        assert_eq!(fix_to_f64(10 << 20), 10.0);
        assert_eq!(fix_to_f64(-(1 << 19)), -0.5);
    }

    #[test]
    fn points_to_pixels() {
        assert_eq!(round_to_int(72.27 * pixels_per_point(100.0, 1.0)), 100);
        assert_eq!(round_to_int(-2.5), -3);
        assert_eq!(round_to_int(2.4), 2);
    }
}
