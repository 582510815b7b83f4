//! Small helpers for scenario data

use rand::distributions::Alphanumeric;
use rand::Rng;

/// `"$29.99"` -> `29.99`; unparsable input yields `None`
pub fn parse_price(price: &str) -> Option<f64> {
    price.trim().trim_start_matches('$').parse().ok()
}

/// Sum of every parsable price
pub fn calculate_total(prices: &[&str]) -> f64 {
    prices.iter().filter_map(|p| parse_price(p)).sum()
}

pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Five digits, 10000 to 99999
pub fn random_postal_code() -> String {
    rand::thread_rng().gen_range(10_000..100_000).to_string()
}

/// Current time as RFC 3339
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("$29.99", Some(29.99) ; "dollar price")]
    #[test_case("9.99", Some(9.99) ; "bare number")]
    #[test_case(" $7.99 ", Some(7.99) ; "padded")]
    #[test_case("free", None ; "not a price")]
    fn test_parse_price(input: &str, expected: Option<f64>) {
        assert_eq!(parse_price(input), expected);
    }

    #[test]
    fn test_total_and_format() {
        let total = calculate_total(&["$29.99", "$9.99", "oops"]);
        assert_eq!(format_currency(total), "$39.98");
    }

    #[test]
    fn test_random_values_shape() {
        assert_eq!(random_string(12).len(), 12);

        let postal = random_postal_code();
        assert_eq!(postal.len(), 5);
        let n: u32 = postal.parse().unwrap();
        assert!((10_000..100_000).contains(&n));
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp()).is_ok());
    }
}
