use super::*;
use std::sync::{Mutex, MutexGuard};

// Every test here mutates the same process-wide variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`lock_env`] to avoid env races.
unsafe fn clear_auth_env() {
    unsafe {
        std::env::remove_var("GITHUB_CLIENT_ID");
        std::env::remove_var("DOWHILE_API_URL");
        std::env::remove_var("DOWHILE_TOKEN_FILE");
        std::env::remove_var("DOWHILE_CALLBACK_ADDR");
        std::env::remove_var("DOWHILE_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("DOWHILE_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("DOWHILE_CALLBACK_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_applies_defaults() {
    let _guard = lock_env();
    unsafe {
        clear_auth_env();
        std::env::set_var("DOWHILE_TOKEN_FILE", "/tmp/dowhile-test/credentials.json");
    }

    let cfg = AuthConfig::from_env().unwrap();
    assert_eq!(cfg.github_client_id, "");
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.token_file, PathBuf::from("/tmp/dowhile-test/credentials.json"));
    assert_eq!(cfg.callback_addr, DEFAULT_CALLBACK_ADDR.parse::<SocketAddr>().unwrap());
    assert_eq!(cfg.callback_timeout_secs, DEFAULT_CALLBACK_TIMEOUT_SECS);
    assert_eq!(
        cfg.timeouts,
        Timeouts { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    );

    unsafe { clear_auth_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = lock_env();
    unsafe {
        clear_auth_env();
        std::env::set_var("GITHUB_CLIENT_ID", "Iv1.abc");
        std::env::set_var("DOWHILE_API_URL", "https://api.example.test/");
        std::env::set_var("DOWHILE_CALLBACK_ADDR", "127.0.0.1:8765");
        std::env::set_var("DOWHILE_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("DOWHILE_CONNECT_TIMEOUT_SECS", " 7 ");
        std::env::set_var("DOWHILE_CALLBACK_TIMEOUT_SECS", "60");
    }

    let cfg = AuthConfig::from_env().unwrap();
    assert_eq!(cfg.github_client_id, "Iv1.abc");
    assert_eq!(cfg.api_url, "https://api.example.test");
    assert_eq!(cfg.callback_addr.port(), 8765);
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });
    assert_eq!(cfg.callback_timeout_secs, 60);

    unsafe { clear_auth_env() };
}

#[test]
fn from_env_rejects_bad_timeout() {
    let _guard = lock_env();
    unsafe {
        clear_auth_env();
        std::env::set_var("DOWHILE_REQUEST_TIMEOUT_SECS", "soon");
    }

    let err = AuthConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("DOWHILE_REQUEST_TIMEOUT_SECS"));

    unsafe { clear_auth_env() };
}

#[test]
fn from_env_rejects_bad_callback_addr() {
    let _guard = lock_env();
    unsafe {
        clear_auth_env();
        std::env::set_var("DOWHILE_CALLBACK_ADDR", "localhost");
    }

    let err = AuthConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "DOWHILE_CALLBACK_ADDR", .. }));

    unsafe { clear_auth_env() };
}

#[test]
fn from_env_rejects_zero_timeouts() {
    let _guard = lock_env();
    for var in ["DOWHILE_REQUEST_TIMEOUT_SECS", "DOWHILE_CONNECT_TIMEOUT_SECS", "DOWHILE_CALLBACK_TIMEOUT_SECS"] {
        unsafe {
            clear_auth_env();
            std::env::set_var(var, "0");
        }

        let err = AuthConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: v, .. } if v == var), "expected {var} to be rejected");
    }

    unsafe { clear_auth_env() };
}
