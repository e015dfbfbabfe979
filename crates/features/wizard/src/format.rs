use crate::validation::digits;

/// Markup applied when the practice leaves the commission untouched.
pub const DEFAULT_COMMISSION: f64 = 10.0;

/// Most the practice earns on a single order, in dollars.
pub const COMMISSION_CAP_PER_ORDER: f64 = 85.0;

/// Formats a phone or fax number the way the wizard shows it while typing.
///
/// Non-digits are dropped and the number is cut to ten digits, then grouped:
/// `(512`, `(512)-555`, `(512)-555-0100`.
#[must_use]
pub fn format_phone(input: &str) -> String {
    let mut number = digits(input);
    number.truncate(10);

    match number.len() {
        0 => String::new(),
        1..=3 => format!("({number}"),
        4..=6 => format!("({})-{}", &number[..3], &number[3..]),
        _ => format!("({})-{}-{}", &number[..3], &number[3..6], &number[6..]),
    }
}

/// What the practice earns on one order of `order_value` dollars at `commission` percent.
///
/// Negative inputs earn nothing; the result never exceeds [`COMMISSION_CAP_PER_ORDER`].
#[must_use]
pub fn commission_per_order(commission: f64, order_value: f64) -> f64 {
    (order_value.max(0.0) * commission.max(0.0) / 100.0).min(COMMISSION_CAP_PER_ORDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_groups_progressively() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("5"), "(5");
        assert_eq!(format_phone("5125"), "(512)-5");
        assert_eq!(format_phone("512555"), "(512)-555");
        assert_eq!(format_phone("512.555.0100"), "(512)-555-0100");
        assert_eq!(format_phone("+1 512 555 0100"), "(151)-255-5010");
    }

    #[test]
    fn commission_is_capped() {
        assert!((commission_per_order(10.0, 200.0) - 20.0).abs() < f64::EPSILON);
        assert!((commission_per_order(50.0, 1000.0) - COMMISSION_CAP_PER_ORDER).abs() < f64::EPSILON);
        assert!(commission_per_order(-5.0, 100.0).abs() < f64::EPSILON);
    }
}
