//! Deterministic name-to-color derivation for generated styles.
//!
//! The hash folds UTF-16 code units with 32-bit wraparound, so a name always
//! maps to the same fill color on every platform. Stroke colors shade the
//! fill 30% toward black using exact integer arithmetic.
//!
//! # Examples
//! ```
//! use gispub_core::color::{fill_color, stroke_color};
//!
//! let fill = fill_color("parcel");
//! assert_eq!(fill.len(), 7);
//! assert!(fill.starts_with('#'));
//! assert_ne!(stroke_color("parcel"), fill);
//! ```

/// Shade applied to stroke channels, in tenths.
const SHADE_TENTHS: i32 = 3;

/// Fold `name` into a 32-bit hash.
#[must_use]
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16().fold(0_i32, |hash, unit| {
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

/// Fill color for `name`, rendered `#RRGGBB`.
#[must_use]
pub fn fill_color(name: &str) -> String {
    render(channels(name_hash(name)))
}

/// Stroke color for `name`: the fill color shaded toward black.
#[must_use]
pub fn stroke_color(name: &str) -> String {
    render(channels(name_hash(name)).map(shade))
}

/// Low three bytes of the hash, least significant first.
fn channels(hash: i32) -> [u8; 3] {
    let [first, second, third, _] = hash.to_le_bytes();
    [first, second, third]
}

/// Blend a channel toward zero: `channel + round_half_up(-0.3 * channel)`.
fn shade(channel: u8) -> u8 {
    let value = i32::from(channel);
    let offset = (5 - SHADE_TENTHS * value).div_euclid(10);
    u8::try_from((value + offset).clamp(0, 255)).unwrap_or(u8::MAX)
}

fn render([red, green, blue]: [u8; 3]) -> String {
    format!("#{red:02x}{green:02x}{blue:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn parse(color: &str) -> [u8; 3] {
        let hex = color.strip_prefix('#').expect("color should start with #");
        let mut out = [0_u8; 3];
        for (index, slot) in out.iter_mut().enumerate() {
            let pair = hex.get(index * 2..index * 2 + 2).expect("two hex digits");
            *slot = u8::from_str_radix(pair, 16).expect("valid hex");
        }
        out
    }

    #[rstest]
    fn empty_name_is_black() {
        assert_eq!(name_hash(""), 0);
        assert_eq!(fill_color(""), "#000000");
        assert_eq!(stroke_color(""), "#000000");
    }

    #[rstest]
    fn single_character_hashes_to_code_unit() {
        // 'a' = 0x61 lands in the first rendered channel.
        assert_eq!(name_hash("a"), 0x61);
        assert_eq!(fill_color("a"), "#610000");
    }

    #[rstest]
    fn hash_wraps_like_int32() {
        // Equivalent to `h = 31 * h + c` truncated to 32 bits after each step.
        let long = "a_very_long_dataset_name_that_overflows_the_hash";
        assert_eq!(name_hash(long), name_hash(long));
        let expected = long
            .encode_utf16()
            .fold(0_i64, |hash, unit| (hash * 31 + i64::from(unit)) as i32 as i64);
        assert_eq!(i64::from(name_hash(long)), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(5, 4)]
    #[case(10, 7)]
    #[case(15, 11)]
    #[case(255, 179)]
    fn shade_rounds_half_up(#[case] channel: u8, #[case] expected: u8) {
        assert_eq!(shade(channel), expected);
    }

    proptest! {
        #[test]
        fn colors_are_deterministic_hex(name in ".{0,32}") {
            let fill = fill_color(&name);
            prop_assert_eq!(fill.len(), 7);
            prop_assert_eq!(&fill, &fill_color(&name));
            prop_assert_eq!(stroke_color(&name), stroke_color(&name));
        }

        #[test]
        fn stroke_is_never_lighter_than_fill(name in ".{0,32}") {
            let fill = parse(&fill_color(&name));
            let stroke = parse(&stroke_color(&name));
            for (f, s) in fill.iter().zip(stroke.iter()) {
                prop_assert!(s <= f);
            }
        }
    }
}
