//! Login surface

use super::data_test;
use crate::spec::Action;

pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const LOGIN_BUTTON: &str = "login-button";
pub const ERROR: &str = "error";

pub fn navigate(path: Option<&str>) -> Action {
    Action::Navigate {
        url: path.unwrap_or("/").to_string(),
        wait_for_selector: Some(data_test(USERNAME)),
    }
}

/// Fill both fields and submit
pub fn login(username: &str, password: &str) -> Vec<Action> {
    vec![
        Action::Fill {
            selector: data_test(USERNAME),
            value: username.to_string(),
        },
        Action::Fill {
            selector: data_test(PASSWORD),
            value: password.to_string(),
        },
        Action::Click {
            selector: data_test(LOGIN_BUTTON),
            timeout_ms: None,
        },
    ]
}

/// The error banner shown for rejected logins
pub fn assert_error(text_contains: &str) -> Action {
    Action::Assert {
        selector: data_test(ERROR),
        visible: Some(true),
        text: None,
        text_contains: Some(text_contains.to_string()),
        count: None,
    }
}
