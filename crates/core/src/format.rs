//! Display formatting for phone numbers and postal codes (CEP).
//!
//! Formatters are best-effort: input that does not have the expected number
//! of digits is returned unchanged rather than rejected. Validation is the
//! job of [`crate::validation`].

/// Keep only the ASCII digits of `s`.
#[must_use]
pub fn strip_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Format a Brazilian phone number.
///
/// - 11 digits (mobile): `(DD) DDDDD-DDDD`
/// - 10 digits (landline): `(DD) DDDD-DDDD`
/// - anything else: `s` unchanged
///
/// ```
/// use customer_intake_core::format_phone;
///
/// assert_eq!(format_phone("11999998888"), "(11) 99999-8888");
/// assert_eq!(format_phone("1144445555"), "(11) 4444-5555");
/// assert_eq!(format_phone("12345"), "12345");
/// ```
#[must_use]
pub fn format_phone(s: &str) -> String {
    let digits = strip_digits(s);
    match digits.len() {
        10 | 11 => {
            let (area, rest) = digits.split_at(2);
            let (prefix, line) = rest.split_at(rest.len() - 4);
            format!("({area}) {prefix}-{line}")
        }
        _ => s.to_string(),
    }
}

/// Format a CEP as `DDDDD-DDD` when it has exactly 8 digits.
///
/// ```
/// use customer_intake_core::format_cep;
///
/// assert_eq!(format_cep("01310100"), "01310-100");
/// assert_eq!(format_cep("0131"), "0131");
/// ```
#[must_use]
pub fn format_cep(s: &str) -> String {
    let digits = strip_digits(s);
    if digits.len() == 8 {
        let (head, tail) = digits.split_at(5);
        format!("{head}-{tail}")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("11999998888", "(11) 99999-8888")]
    #[case("(11) 99999-8888", "(11) 99999-8888")]
    #[case("11 9 9999 8888", "(11) 99999-8888")]
    #[case("1144445555", "(11) 4444-5555")]
    #[case("+55 11 4444", "+55 11 4444")]
    #[case("", "")]
    #[case("551199999888877", "551199999888877")]
    fn test_format_phone(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_phone(input), expected);
    }

    #[rstest]
    #[case("01310100", "01310-100")]
    #[case("01310-100", "01310-100")]
    #[case("01.310-100", "01310-100")]
    #[case("1234567", "1234567")]
    #[case("", "")]
    fn test_format_cep(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_cep(input), expected);
    }

    #[test]
    fn test_strip_digits_ignores_non_ascii_digits() {
        assert_eq!(strip_digits("(11) ٣99-x"), "1199");
    }

    proptest! {
        #[test]
        fn prop_format_phone_idempotent(digits in "[0-9]{10,11}", noise in "[ ()+.-]{0,3}") {
            let input = format!("{noise}{digits}");
            let once = format_phone(&input);
            prop_assert_eq!(format_phone(&once), once);
        }

        #[test]
        fn prop_format_phone_keeps_digits(digits in "[0-9]{10,11}") {
            prop_assert_eq!(strip_digits(&format_phone(&digits)), digits);
        }

        #[test]
        fn prop_format_cep_round_trip(digits in "[0-9]{8}") {
            let formatted = format_cep(&digits);
            prop_assert_eq!(formatted.len(), 9);
            prop_assert_eq!(strip_digits(&formatted), digits);
        }
    }
}
