//! Cart page

use super::data_test;
use crate::spec::Action;

pub const PATH: &str = "/cart.html";
pub const URL_PATTERN: &str = "**/cart.html";
pub const ITEM_PRICE: &str = "inventory-item-price";
pub const CONTINUE_SHOPPING: &str = "continue-shopping";
pub const CHECKOUT: &str = "checkout";
pub const ITEM_NAME: &str = "inventory-item-name";

pub fn navigate() -> Action {
    Action::Navigate {
        url: PATH.to_string(),
        wait_for_selector: None,
    }
}

pub fn assert_item_count(count: usize) -> Action {
    Action::Assert {
        selector: data_test(ITEM_NAME),
        visible: None,
        text: None,
        text_contains: None,
        count: Some(count),
    }
}

/// The cart holds exactly one line, named `product`
pub fn assert_only_item(product: &str) -> Action {
    Action::Assert {
        selector: data_test(ITEM_NAME),
        visible: None,
        text: Some(product.to_string()),
        text_contains: None,
        count: Some(1),
    }
}

pub fn checkout() -> Action {
    Action::Click {
        selector: data_test(CHECKOUT),
        timeout_ms: None,
    }
}

pub fn continue_shopping() -> Action {
    Action::Click {
        selector: data_test(CONTINUE_SHOPPING),
        timeout_ms: None,
    }
}
