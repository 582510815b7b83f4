//! Built-in storefront scenarios
//!
//! Used when no scenario directory is given. Each one starts either from
//! the shared login session or, for `no_auth`, from a fresh context.

use crate::config::Credentials;
use crate::helpers::{calculate_total, format_currency, random_postal_code, random_string};
use crate::pages::checkout::CustomerInfo;
use crate::pages::{cart, checkout, data_test, login, products};
use crate::spec::{Action, ScenarioSpec};

const BACKPACK: &str = "Sauce Labs Backpack";
const BACKPACK_PRICE: &str = "$29.99";
const BIKE_LIGHT: &str = "Sauce Labs Bike Light";
const BIKE_LIGHT_PRICE: &str = "$9.99";
const BOLT_T_SHIRT: &str = "Sauce Labs Bolt T-Shirt";
const ONESIE: &str = "Sauce Labs Onesie";
const BACKPACK_TAX: &str = "$2.40";
const BACKPACK_TOTAL: &str = "$32.39";
const PRODUCT_COUNT: usize = 6;

/// Throwaway shipping details
pub fn random_customer() -> CustomerInfo {
    CustomerInfo {
        first_name: "Test".to_string(),
        last_name: format!("User{}", random_string(6)),
        postal_code: random_postal_code(),
    }
}

fn title_is(text: &str) -> Action {
    Action::Assert {
        selector: data_test(products::TITLE),
        visible: Some(true),
        text: Some(text.to_string()),
        text_contains: None,
        count: None,
    }
}

fn scenario(name: &str, description: &str, tags: &[&str], steps: Vec<Action>) -> ScenarioSpec {
    ScenarioSpec {
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        no_auth: false,
        steps,
    }
}

/// The suite's scenarios. `creds` drive the no-auth login scenario.
pub fn builtin(creds: &Credentials, customer: &CustomerInfo) -> Vec<ScenarioSpec> {
    let mut successful_login = scenario(
        "successful-login",
        "Valid credentials land on the products page",
        &["login", "smoke"],
        {
            let mut steps = vec![login::navigate(None)];
            steps.extend(login::login(&creds.username, &creds.password));
            steps.push(products::wait_for_landing());
            steps.push(title_is(products::EXPECTED_TITLE));
            steps.push(products::assert_product_count(PRODUCT_COUNT));
            steps
        },
    );
    successful_login.no_auth = true;

    let mut locked_out = scenario(
        "locked-out-login",
        "A locked out user sees the error banner",
        &["login"],
        {
            let mut steps = vec![login::navigate(None)];
            steps.extend(login::login("locked_out_user", "secret_sauce"));
            steps.push(login::assert_error("locked out"));
            steps
        },
    );
    locked_out.no_auth = true;

    let verify_cart = scenario(
        "verify-cart-contents",
        "Cart lists an added backpack with its price",
        &["cart", "smoke"],
        vec![
            products::navigate(),
            products::add_to_cart(BACKPACK),
            products::assert_cart_badge(1),
            products::go_to_cart(),
            Action::WaitForUrl {
                pattern: cart::URL_PATTERN.to_string(),
            },
            title_is("Your Cart"),
            cart::assert_item_count(1),
            Action::Assert {
                selector: data_test(cart::ITEM_PRICE),
                visible: None,
                text: Some(BACKPACK_PRICE.to_string()),
                text_contains: None,
                count: None,
            },
        ],
    );

    let remove_from_cart = scenario(
        "remove-from-cart-page",
        "Removing one of two items updates the cart and badge",
        &["cart"],
        vec![
            products::navigate(),
            products::add_to_cart(BACKPACK),
            products::add_to_cart(BIKE_LIGHT),
            products::assert_cart_badge(2),
            cart::navigate(),
            products::remove_from_cart(BACKPACK),
            cart::assert_item_count(1),
            products::assert_cart_badge(1),
            cart::continue_shopping(),
            products::wait_for_landing(),
        ],
    );

    let subtotal = format_currency(calculate_total(&[BACKPACK_PRICE, BIKE_LIGHT_PRICE]));
    let mut complete_steps = vec![
        products::navigate(),
        products::add_to_cart(BACKPACK),
        products::add_to_cart(BIKE_LIGHT),
        products::go_to_cart(),
        cart::checkout(),
    ];
    complete_steps.extend(checkout::fill_information(customer));
    complete_steps.push(checkout::assert_subtotal(&subtotal));
    complete_steps.push(checkout::finish());
    complete_steps.push(checkout::assert_complete());
    let complete_checkout = scenario(
        "complete-checkout-multiple-items",
        "Two items check out with the expected subtotal",
        &["checkout", "smoke"],
        complete_steps,
    );

    let mut cancel_steps = vec![
        products::navigate(),
        products::add_to_cart(BACKPACK),
        products::go_to_cart(),
        cart::checkout(),
    ];
    cancel_steps.extend(checkout::fill_information(customer));
    cancel_steps.push(checkout::cancel());
    cancel_steps.push(products::wait_for_landing());
    cancel_steps.push(products::assert_cart_badge(1));
    let cancel_checkout = scenario(
        "cancel-checkout-overview-page",
        "Cancelling on the overview returns to products and keeps the cart",
        &["checkout"],
        cancel_steps,
    );

    let mut add_multiple_steps = vec![products::navigate()];
    for (n, product) in [BACKPACK, BIKE_LIGHT, BOLT_T_SHIRT].into_iter().enumerate() {
        add_multiple_steps.push(products::add_to_cart(product));
        add_multiple_steps.push(products::assert_in_cart(product, true));
        add_multiple_steps.push(products::assert_cart_badge(n + 1));
    }
    let add_multiple = scenario(
        "add-multiple-products",
        "Each added product flips to Remove and bumps the badge",
        &["cart"],
        add_multiple_steps,
    );

    let remove_from_products = scenario(
        "remove-from-products-page",
        "Removing the only item from the products page clears the badge",
        &["cart"],
        vec![
            products::navigate(),
            products::add_to_cart(BIKE_LIGHT),
            products::assert_in_cart(BIKE_LIGHT, true),
            products::assert_cart_badge(1),
            products::remove_from_cart(BIKE_LIGHT),
            products::assert_in_cart(BIKE_LIGHT, false),
            products::assert_cart_empty(),
            products::assert_product_count(PRODUCT_COUNT),
        ],
    );

    let remove_one_of_multiple = scenario(
        "remove-one-of-multiple",
        "Removing one of two items in the cart keeps the other",
        &["cart"],
        vec![
            products::navigate(),
            products::add_to_cart(BACKPACK),
            products::add_to_cart(BIKE_LIGHT),
            products::assert_cart_badge(2),
            products::go_to_cart(),
            Action::WaitForUrl {
                pattern: cart::URL_PATTERN.to_string(),
            },
            products::remove_from_cart(BACKPACK),
            cart::assert_only_item(BIKE_LIGHT),
            products::assert_cart_badge(1),
            Action::Assert {
                selector: data_test(cart::ITEM_PRICE),
                visible: None,
                text: Some(BIKE_LIGHT_PRICE.to_string()),
                text_contains: None,
                count: None,
            },
        ],
    );

    let mut single_steps = vec![
        products::navigate(),
        products::add_to_cart(BACKPACK),
        products::assert_cart_badge(1),
        products::go_to_cart(),
        cart::assert_only_item(BACKPACK),
        cart::checkout(),
    ];
    single_steps.extend(checkout::fill_information(customer));
    single_steps.push(checkout::assert_subtotal(&format_currency(calculate_total(&[
        BACKPACK_PRICE,
    ]))));
    single_steps.push(checkout::assert_tax(BACKPACK_TAX));
    single_steps.push(checkout::assert_total(BACKPACK_TOTAL));
    single_steps.push(checkout::finish());
    single_steps.push(checkout::assert_complete());
    let complete_single = scenario(
        "complete-checkout-single-item",
        "One backpack checks out with tax and total",
        &["checkout"],
        single_steps,
    );

    let mut return_steps = vec![
        products::navigate(),
        products::add_to_cart(ONESIE),
        products::assert_cart_badge(1),
        products::go_to_cart(),
        cart::checkout(),
    ];
    return_steps.extend(checkout::fill_information(customer));
    return_steps.push(checkout::finish());
    return_steps.push(checkout::assert_complete());
    return_steps.push(checkout::back_home());
    return_steps.push(products::wait_for_landing());
    return_steps.push(products::assert_product_count(PRODUCT_COUNT));
    return_steps.push(products::assert_cart_empty());
    return_steps.push(products::assert_in_cart(ONESIE, false));
    return_steps.push(products::add_to_cart(BACKPACK));
    return_steps.push(products::assert_cart_badge(1));
    let return_after_checkout = scenario(
        "return-to-products-after-checkout",
        "Back Home after an order shows an empty cart and lets shopping resume",
        &["checkout"],
        return_steps,
    );

    vec![
        successful_login,
        locked_out,
        add_multiple,
        verify_cart,
        remove_from_cart,
        remove_from_products,
        remove_one_of_multiple,
        complete_single,
        complete_checkout,
        cancel_checkout,
        return_after_checkout,
    ]
}
