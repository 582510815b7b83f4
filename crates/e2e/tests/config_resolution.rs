//! Precedence: environment variable > profile file > default

mod common;

use common::{env, write_profile};
use storefront_e2e::config::{Credentials, DEFAULT_BASE_URL};
use storefront_e2e::ConfigResolver;

#[test]
fn absent_profile_and_env_yield_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let resolver = ConfigResolver::for_project(tmp.path(), env(&[]));

    let config = resolver.resolve("default").unwrap();
    assert_eq!(config.base_url, "https://www.saucedemo.com");
    assert!(config.headless);
    assert_eq!(config.timeouts.default_ms, 30_000);
}

#[test]
fn missing_profiles_never_fail_bootstrap() {
    let tmp = tempfile::tempdir().unwrap();
    let resolver = ConfigResolver::for_project(
        tmp.path(),
        env(&[("BASE_URL", "https://qa.example.com"), ("HEADLESS", "false")]),
    );

    for name in ["default", "staging", "does-not-exist"] {
        let config = resolver.resolve(name).unwrap();
        assert_eq!(config, resolver.defaults());
        assert_eq!(config.base_url, "https://qa.example.com");
        assert!(!config.headless);
    }
}

#[test]
fn base_url_env_beats_profile() {
    let tmp = tempfile::tempdir().unwrap();
    write_profile(tmp.path(), "default", r#"{ "baseUrl": "https://www.saucedemo.com" }"#);
    let resolver = ConfigResolver::for_project(
        tmp.path(),
        env(&[("BASE_URL", "https://staging.example.com")]),
    );

    assert_eq!(
        resolver.resolve("default").unwrap().base_url,
        "https://staging.example.com"
    );
}

#[test]
fn env_credentials_win_for_every_role() {
    let tmp = tempfile::tempdir().unwrap();
    write_profile(
        tmp.path(),
        "default",
        r#"{
            "credentials": {
                "standard_user": { "username": "standard_user", "password": "secret_sauce" },
                "problem_user": { "username": "problem_user", "password": "secret_sauce" }
            }
        }"#,
    );
    let resolver = ConfigResolver::for_project(
        tmp.path(),
        env(&[("USERNAME", "foo"), ("PASSWORD", "bar")]),
    );

    for role in ["standard_user", "problem_user", "unknown_role"] {
        assert_eq!(resolver.get_credentials("default", role), Credentials::new("foo", "bar"));
    }
}

#[test]
fn get_credentials_recovers_from_broken_profile() {
    let tmp = tempfile::tempdir().unwrap();
    write_profile(tmp.path(), "default", "{ \"credentials\": ");
    let resolver = ConfigResolver::for_project(tmp.path(), env(&[]));

    assert!(resolver.resolve("default").is_err());
    assert_eq!(
        resolver.get_credentials("default", "standard_user"),
        Credentials::new("standard_user", "secret_sauce")
    );
    assert_eq!(resolver.resolve_or_default("default").base_url, DEFAULT_BASE_URL);
}

#[test]
fn resolve_is_repeatable() {
    let tmp = tempfile::tempdir().unwrap();
    write_profile(tmp.path(), "ci", r#"{ "environment": "ci", "timeout": { "default": 10000 } }"#);
    let resolver = ConfigResolver::for_project(tmp.path(), env(&[("PROFILE", "ci")]));

    let first = resolver.resolve("ci").unwrap();
    let second = resolver.resolve("ci").unwrap();
    assert_eq!(first, second);
    assert_eq!(first.timeouts.default_ms, 10_000);
    assert_eq!(first.timeouts.navigation_ms, 30_000);
}
