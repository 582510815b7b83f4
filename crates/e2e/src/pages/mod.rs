//! Page capabilities
//!
//! Stateless builders over `[data-test="..."]` selectors. Each function
//! returns the [`Action`](crate::spec::Action)s that perform one user-level
//! operation; nothing here holds a browser handle.

pub mod cart;
pub mod checkout;
pub mod login;
pub mod products;

/// Selector for a `data-test` attribute value
pub fn data_test(id: &str) -> String {
    format!(r#"[data-test="{}"]"#, id)
}

/// `Sauce Labs Bike Light` -> `sauce-labs-bike-light`
pub fn product_slug(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
