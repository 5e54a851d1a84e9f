use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use storefront_cli::commands::{config, doctor, migrate, seed};

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("STOREFRONT_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_invalid_database_url() {
    with_env(&[("STOREFRONT_DATABASE_URL", "postgres://localhost/storefront")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_loads_demo_products_into_empty_store() {
    with_env(
        &[
            ("STOREFRONT_DATABASE_URL", "sqlite::memory:"),
            ("STOREFRONT_DATABASE_MAX_CONNECTIONS", "1"),
        ],
        || {
            let result = seed::run();
            assert_eq!(result.exit_code, 0, "expected successful seed");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "seed");
            assert_eq!(payload["status"], "ok");
            assert!(payload["message"]
                .as_str()
                .expect("message")
                .starts_with("seeded 4 demo products"));
        },
    );
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("seed.db").display());

    with_env(&[("STOREFRONT_DATABASE_URL", url.as_str())], || {
        let first = seed::run();
        let second = seed::run();

        assert_eq!(first.exit_code, 0);
        assert_eq!(second.exit_code, 0);
        let second_payload = parse_payload(&second.output);
        assert!(second_payload["message"]
            .as_str()
            .expect("message")
            .contains("nothing seeded"));
    });
}

#[test]
fn config_reports_env_attribution() {
    with_env(&[("STOREFRONT_CATALOG_TIMEOUT_SECS", "7")], || {
        let output = config::run();

        assert!(output.contains(
            "- catalog.timeout_secs = 7 (source: env (STOREFRONT_CATALOG_TIMEOUT_SECS))"
        ));
        assert!(output.contains("- server.port = 5001 (source: default)"));
    });
}

#[test]
fn doctor_fails_when_external_catalog_is_unreachable() {
    with_env(
        &[
            ("STOREFRONT_DATABASE_URL", "sqlite::memory:"),
            ("STOREFRONT_CATALOG_BASE_URL", "http://127.0.0.1:9"),
            ("STOREFRONT_CATALOG_TIMEOUT_SECS", "2"),
        ],
        || {
            let result = doctor::run(true);
            assert_eq!(result.exit_code, 1);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["overall_status"], "fail");
            let checks = payload["checks"].as_array().expect("checks");
            assert_eq!(checks[0]["name"], "config_validation");
            assert_eq!(checks[0]["status"], "pass");
            assert_eq!(checks[1]["name"], "database_connectivity");
            assert_eq!(checks[1]["status"], "pass");
            assert_eq!(checks[2]["name"], "external_catalog");
            assert_eq!(checks[2]["status"], "fail");
        },
    );
}

#[test]
fn doctor_skips_runtime_checks_when_config_invalid() {
    with_env(&[("STOREFRONT_LOGGING_LEVEL", "verbose")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        let checks = payload["checks"].as_array().expect("checks");
        assert_eq!(checks[0]["status"], "fail");
        assert_eq!(checks[1]["status"], "skipped");
        assert_eq!(checks[2]["status"], "skipped");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STOREFRONT_DATABASE_URL",
        "STOREFRONT_DATABASE_MAX_CONNECTIONS",
        "STOREFRONT_DATABASE_TIMEOUT_SECS",
        "STOREFRONT_CATALOG_BASE_URL",
        "STOREFRONT_CATALOG_TIMEOUT_SECS",
        "STOREFRONT_SERVER_BIND_ADDRESS",
        "STOREFRONT_SERVER_PORT",
        "STOREFRONT_SERVER_ALLOWED_ORIGINS",
        "STOREFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "STOREFRONT_LOGGING_LEVEL",
        "STOREFRONT_LOGGING_FORMAT",
        "STOREFRONT_LOG_LEVEL",
        "STOREFRONT_LOG_FORMAT",
        "PORT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
