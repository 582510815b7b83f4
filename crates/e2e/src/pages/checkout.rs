//! Checkout steps one, two and complete

use super::data_test;
use crate::spec::Action;

pub const SUBTOTAL: &str = "subtotal-label";
pub const TAX: &str = "tax-label";
pub const TOTAL: &str = "total-label";
pub const BACK_HOME: &str = "back-to-products";
pub const COMPLETE_HEADER: &str = "complete-header";
pub const COMPLETE_TEXT: &str = "Thank you for your order!";

/// Shipping details for step one
#[derive(Debug, Clone)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

pub fn fill_information(info: &CustomerInfo) -> Vec<Action> {
    let fill = |id: &str, value: &str| Action::Fill {
        selector: data_test(id),
        value: value.to_string(),
    };
    vec![
        fill("firstName", &info.first_name),
        fill("lastName", &info.last_name),
        fill("postalCode", &info.postal_code),
        Action::Click {
            selector: data_test("continue"),
            timeout_ms: None,
        },
    ]
}

pub fn finish() -> Action {
    Action::Click {
        selector: data_test("finish"),
        timeout_ms: None,
    }
}

pub fn cancel() -> Action {
    Action::Click {
        selector: data_test("cancel"),
        timeout_ms: None,
    }
}

pub fn assert_subtotal(amount: &str) -> Action {
    label_contains(SUBTOTAL, amount)
}

pub fn back_home() -> Action {
    Action::Click {
        selector: data_test(BACK_HOME),
        timeout_ms: None,
    }
}

fn label_contains(id: &str, amount: &str) -> Action {
    Action::Assert {
        selector: data_test(id),
        visible: None,
        text: None,
        text_contains: Some(amount.to_string()),
        count: None,
    }
}

pub fn assert_tax(amount: &str) -> Action {
    label_contains(TAX, amount)
}

pub fn assert_total(amount: &str) -> Action {
    label_contains(TOTAL, amount)
}

pub fn assert_complete() -> Action {
    Action::Assert {
        selector: data_test(COMPLETE_HEADER),
        visible: Some(true),
        text: Some(COMPLETE_TEXT.to_string()),
        text_contains: None,
        count: None,
    }
}
