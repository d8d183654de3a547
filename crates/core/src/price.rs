//! First-number price extraction from free-form offer text.
//!
//! The first integer or decimal (up to two fraction digits) in the text is
//! taken as the offer, whatever it actually refers to: "2 units for 80"
//! yields 2. No currency markers or thousands separators are understood,
//! so "$1,200" yields 1. Only ASCII digits count; other scripts' digits are
//! skipped like any other text, as are digit runs too long for a `Decimal`.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

const PRICE_PATTERN: &str = r"[0-9]+(?:\.[0-9]{1,2})?";

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PRICE_PATTERN).expect("price pattern is a valid regex"))
}

pub fn extract_price(text: &str) -> Option<Decimal> {
    price_pattern().find_iter(text).find_map(|token| Decimal::from_str(token.as_str()).ok())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::extract_price;

    #[test]
    fn picks_first_number_not_the_intended_one() {
        assert_eq!(extract_price("I'll pay 45 not 50"), Some(Decimal::new(45, 0)));
    }

    #[test]
    fn parses_two_digit_decimal() {
        assert_eq!(extract_price("would you take 79.99?"), Some(Decimal::new(7999, 2)));
    }

    #[test]
    fn truncates_fraction_beyond_two_digits() {
        assert_eq!(extract_price("offer 12.345 now"), Some(Decimal::new(1234, 2)));
    }

    #[test]
    fn trailing_dot_is_not_part_of_the_number() {
        assert_eq!(extract_price("I can offer 80."), Some(Decimal::new(80, 0)));
    }

    #[test]
    fn ignores_currency_symbols_and_separators() {
        assert_eq!(extract_price("$1,200 is my limit"), Some(Decimal::new(1, 0)));
        assert_eq!(extract_price("€60 final"), Some(Decimal::new(60, 0)));
    }

    #[test]
    fn leading_dot_fraction_reads_the_digits_only() {
        assert_eq!(extract_price("just .5 more"), Some(Decimal::new(5, 0)));
    }

    #[test]
    fn absent_when_no_digits() {
        assert_eq!(extract_price("no numbers here"), None);
        assert_eq!(extract_price(""), None);
    }

    #[test]
    fn non_ascii_digits_are_skipped() {
        assert_eq!(extract_price("I'll pay \u{0663} or 50"), Some(Decimal::new(50, 0)));
        assert_eq!(extract_price("\u{FF18}\u{FF10} dollars"), None);
    }

    #[test]
    fn oversized_digit_run_falls_through_to_next_number() {
        assert_eq!(
            extract_price("order 123456789012345678901234567890 for 80"),
            Some(Decimal::new(80, 0))
        );
    }

    #[test]
    fn digits_inside_words_still_count() {
        assert_eq!(extract_price("model X200 for 90"), Some(Decimal::new(200, 0)));
    }
}
