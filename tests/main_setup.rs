use serial_test::serial;
use std::{env, panic};
use tripfeed_gateway::{AppConfig, config::Env};

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "API_BASE_URL",
    "CONTENT_BASE_URL",
    "WEATHER_BASE_URL",
    "SHORTS_MAX_RESULTS",
    "BIND_ADDR",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` and restores every config variable to its previous value afterwards,
/// re-raising any panic from the test.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
                env::set_var("API_BASE_URL", "https://api.example.com");
            }
            // CONTENT_BASE_URL and WEATHER_BASE_URL are missing
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic on missing upstream URLs"
    );
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:8080/api");
    assert_eq!(config.content_base_url, "http://localhost:8080/api/youtube");
    assert_eq!(config.shorts_max_results, 10);
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert!(!config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_production_reads_everything() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("API_BASE_URL", "https://api.example.com");
            env::set_var("CONTENT_BASE_URL", "https://api.example.com/youtube");
            env::set_var("WEATHER_BASE_URL", "https://weather.example.com");
            env::set_var("SHORTS_MAX_RESULTS", "25");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.weather_base_url, "https://weather.example.com");
    assert_eq!(config.shorts_max_results, 25);
    assert!(config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_ignores_unparseable_max_results() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("SHORTS_MAX_RESULTS", "lots");
        }
        AppConfig::load()
    });

    assert_eq!(config.shorts_max_results, 10);
}
