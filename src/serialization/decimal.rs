//! Fixed-precision decimal formatting with half-up rounding.

/// Formats `value` with at most `precision` fractional digits.
///
/// Rounding is half-up on the exact binary value, trailing zeros are trimmed, the decimal point
/// is dropped for whole numbers, and a value that rounds to zero is written as `0`. Negative
/// infinity is written as `-inf`.
#[must_use]
pub fn format_decimal(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf".into() } else { "inf".into() };
    }

    // Enough digits that the float formatter never rounds: the expansion below is exact.
    let digits_needed = exact_fraction_digits(value).max(precision + 1);
    let expanded = format!("{:.*}", digits_needed, value.abs());
    let (int_part, frac_part) = expanded.split_once('.').unwrap_or((expanded.as_str(), ""));
    let frac = frac_part.as_bytes();

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend_from_slice(&frac[..precision.min(frac.len())]);
    if frac.get(precision).is_some_and(|&next| next >= b'5') {
        round_up(&mut digits);
    }

    let split = digits.len() - precision;
    let (int_digits, frac_digits) = digits.split_at(split);
    let frac_digits = trim_trailing_zeros(frac_digits);

    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 && !(is_zero(int_digits) && frac_digits.is_empty()) {
        out.push('-');
    }
    out.extend(int_digits.iter().map(|&d| char::from(d)));
    if !frac_digits.is_empty() {
        out.push('.');
        out.extend(frac_digits.iter().map(|&d| char::from(d)));
    }
    out
}

/// Number of fractional decimal digits in the exact expansion of a finite `value`.
///
/// `value = m * 2^e` with odd `m` has exactly `-e` fractional digits when `e < 0`.
fn exact_fraction_digits(value: f64) -> usize {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return 0;
    }
    let exponent = exponent + i64::from(mantissa.trailing_zeros());
    usize::try_from(-exponent).unwrap_or(0)
}

fn round_up(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

fn trim_trailing_zeros(digits: &[u8]) -> &[u8] {
    let end = digits
        .iter()
        .rposition(|&d| d != b'0')
        .map_or(0, |idx| idx + 1);
    &digits[..end]
}

fn is_zero(digits: &[u8]) -> bool {
    digits.iter().all(|&d| d == b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_zeros() {
        assert_eq!(format_decimal(0.5, 5), "0.5");
        assert_eq!(format_decimal(-1.0, 5), "-1");
        assert_eq!(format_decimal(0.0, 5), "0");
        assert_eq!(format_decimal(12.25, 5), "12.25");
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(format_decimal(1.0 / 3.0, 5), "0.33333");
        assert_eq!(format_decimal(2.0 / 3.0, 5), "0.66667");
        // 1/64 = 0.015625 is exactly representable, so this is a true tie.
        assert_eq!(format_decimal(0.015_625, 5), "0.01563");
        assert_eq!(format_decimal(-0.015_625, 5), "-0.01563");
        assert_eq!(format_decimal(0.125, 2), "0.13");
    }

    #[test]
    fn carries_into_integer_part() {
        assert_eq!(format_decimal(0.999_996, 5), "1");
        assert_eq!(format_decimal(9.999_996, 5), "10");
        assert_eq!(format_decimal(-99.999_999, 5), "-100");
    }

    #[test]
    fn tiny_values_round_to_unsigned_zero() {
        assert_eq!(format_decimal(0.000_004, 5), "0");
        assert_eq!(format_decimal(-0.000_004, 5), "0");
        assert_eq!(format_decimal(-0.0, 5), "0");
    }

    #[test]
    fn exact_expansion_length() {
        assert_eq!(exact_fraction_digits(0.0), 0);
        assert_eq!(exact_fraction_digits(3.0), 0);
        assert_eq!(exact_fraction_digits(1024.0), 0);
        assert_eq!(exact_fraction_digits(0.5), 1);
        assert_eq!(exact_fraction_digits(-0.015_625), 6);
        assert_eq!(exact_fraction_digits(0.1), 55);
        assert_eq!(exact_fraction_digits(f64::from_bits(1)), 1074);
    }

    #[test]
    fn rounds_the_binary_value_at_high_precision() {
        // 2.675 is stored as 2.67499999999999982236431605997495353221893310546875.
        assert_eq!(format_decimal(2.675, 2), "2.67");
        assert_eq!(format_decimal(2.675, 15), "2.675");
        assert_eq!(format_decimal(2.675, 16), "2.6749999999999998");
        // 0.1 is stored as 0.1000000000000000055511151231257827...
        assert_eq!(format_decimal(0.1, 15), "0.1");
        assert_eq!(format_decimal(0.1, 17), "0.10000000000000001");
        // 2^-20 = 0.00000095367431640625 exactly, a true tie at 19 digits.
        assert_eq!(format_decimal(0.000_000_953_674_316_406_25, 19), "0.0000009536743164063");
        assert_eq!(format_decimal(f64::from_bits(1), 15), "0");
    }

    #[test]
    fn log_probabilities_format() {
        assert_eq!(format_decimal((1.0f64 / 3.0).log2(), 5), "-1.58496");
        assert_eq!(format_decimal(0.25f64.log2(), 5), "-2");
    }

    #[test]
    fn non_finite_values_use_markers() {
        assert_eq!(format_decimal(f64::NEG_INFINITY, 5), "-inf");
        assert_eq!(format_decimal(f64::INFINITY, 5), "inf");
        assert_eq!(format_decimal(f64::NAN, 5), "NaN");
    }
}
