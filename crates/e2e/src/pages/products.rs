//! Products (inventory) page, the landing view after login

use super::{data_test, product_slug};
use crate::spec::Action;

pub const PATH: &str = "/inventory.html";
pub const URL_PATTERN: &str = "**/inventory.html";
pub const TITLE: &str = "title";
pub const EXPECTED_TITLE: &str = "Products";
pub const INVENTORY_ITEM: &str = "inventory-item";
pub const CART_LINK: &str = "shopping-cart-link";
pub const CART_BADGE: &str = "shopping-cart-badge";

pub fn navigate() -> Action {
    Action::Navigate {
        url: PATH.to_string(),
        wait_for_selector: Some(data_test(TITLE)),
    }
}

pub fn wait_for_landing() -> Action {
    Action::WaitForUrl {
        pattern: URL_PATTERN.to_string(),
    }
}

/// Read the page heading into the capture `name`
pub fn capture_title(name: &str) -> Action {
    Action::Capture {
        name: name.to_string(),
        selector: data_test(TITLE),
    }
}

pub fn add_to_cart(product: &str) -> Action {
    Action::Click {
        selector: data_test(&format!("add-to-cart-{}", product_slug(product))),
        timeout_ms: None,
    }
}

pub fn remove_from_cart(product: &str) -> Action {
    Action::Click {
        selector: data_test(&format!("remove-{}", product_slug(product))),
        timeout_ms: None,
    }
}

pub fn assert_cart_badge(count: usize) -> Action {
    Action::Assert {
        selector: data_test(CART_BADGE),
        visible: Some(true),
        text: Some(count.to_string()),
        text_contains: None,
        count: None,
    }
}

/// Badge disappears once the cart is empty
pub fn assert_cart_empty() -> Action {
    Action::Assert {
        selector: data_test(CART_BADGE),
        visible: Some(false),
        text: None,
        text_contains: None,
        count: None,
    }
}

/// `Remove` is shown for a product in the cart, `Add to cart` otherwise
pub fn assert_in_cart(product: &str, in_cart: bool) -> Action {
    let slug = product_slug(product);
    let shown = if in_cart {
        format!("remove-{}", slug)
    } else {
        format!("add-to-cart-{}", slug)
    };
    Action::Assert {
        selector: data_test(&shown),
        visible: Some(true),
        text: None,
        text_contains: None,
        count: None,
    }
}

pub fn assert_product_count(count: usize) -> Action {
    Action::Assert {
        selector: data_test(INVENTORY_ITEM),
        visible: None,
        text: None,
        text_contains: None,
        count: Some(count),
    }
}

pub fn go_to_cart() -> Action {
    Action::Click {
        selector: data_test(CART_LINK),
        timeout_ms: None,
    }
}
