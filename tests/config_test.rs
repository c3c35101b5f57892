use codegen_eval::config::{Config, RunSettings};
use codegen_eval::dispatch::FailurePolicy;
use codegen_eval::error::Error;
use codegen_eval::llm::Provider;
use secrecy::ExposeSecret;
use std::sync::Mutex;
use std::time::Duration;

// Env vars are process-global; tests touching them take this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    unsafe {
        std::env::remove_var("LLM_PROVIDER");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("ANTHROPIC_API_KEY");
    }
}

#[test]
fn config_from_env_loads_openai_by_default() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("OPENAI_API_KEY", "sk-test-key");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.provider, Provider::OpenAi);
    assert_eq!(config.api_key.expose_secret(), "sk-test-key");
    assert!(!config.log_level.is_empty());
    assert!(!config.base_dir.as_os_str().is_empty());

    clear_env();
}

#[test]
fn config_debug_does_not_leak_key() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("OPENAI_API_KEY", "sk-very-secret");
    }

    let config = Config::from_env().unwrap();
    assert!(!format!("{config:?}").contains("sk-very-secret"));

    clear_env();
}

#[test]
fn config_reads_key_for_selected_provider() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("LLM_PROVIDER", "Anthropic");
        std::env::set_var("OPENAI_API_KEY", "sk-openai");
    }

    // Only the OpenAI key is present, so the Anthropic config must fail.
    assert!(Config::from_env().is_err());

    unsafe {
        std::env::set_var("ANTHROPIC_API_KEY", "sk-ant");
    }
    let config = Config::from_env().unwrap();
    assert_eq!(config.provider, Provider::Anthropic);
    assert_eq!(config.api_key.expose_secret(), "sk-ant");

    clear_env();
}

#[test]
fn config_from_env_fails_without_required() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let result = Config::from_env();
    assert!(result.is_err());
}

#[test]
fn config_rejects_unknown_provider() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    unsafe {
        std::env::set_var("LLM_PROVIDER", "carrier-pigeon");
        std::env::set_var("OPENAI_API_KEY", "sk-test-key");
    }

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("carrier-pigeon"));

    clear_env();
}

// ---------------------------------------------------------------------------
// Run settings
// ---------------------------------------------------------------------------

#[test]
fn run_settings_defaults_match_harness() {
    let settings = RunSettings::default();
    assert_eq!(settings.batch_size, 15);
    assert_eq!(settings.failure_policy, FailurePolicy::SkipItem);

    let retry = settings.retry_policy().unwrap();
    assert_eq!(retry.max_attempts(), 6);
    assert_eq!(
        retry.bounds(2),
        (Duration::from_secs(1), Duration::from_secs(2))
    );
}

#[test]
fn run_settings_load_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(
        &path,
        r#"
batch_size = 4
failure_policy = "fail_batch"

[retry]
max_attempts = 3
"#,
    )
    .unwrap();

    let settings = RunSettings::load(&path).unwrap();
    assert_eq!(settings.batch_size, 4);
    assert_eq!(settings.failure_policy, FailurePolicy::FailBatch);
    assert_eq!(settings.retry.max_attempts, 3);
    assert_eq!(settings.retry.max_delay_secs, 60.0);
}

#[test]
fn run_settings_reject_zero_batch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(&path, "batch_size = 0\n").unwrap();

    assert!(RunSettings::load(&path).is_err());
}

#[test]
fn run_settings_reject_delay_too_large_for_duration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(&path, "[retry]\nmax_delay_secs = 1e30\n").unwrap();

    match RunSettings::load(&path) {
        Err(Error::Config(msg)) => assert!(msg.contains("max_delay_secs")),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn run_settings_reject_negative_delay() {
    let mut settings = RunSettings::default();
    settings.retry.min_delay_secs = -1.0;

    assert!(matches!(settings.validate(), Err(Error::Config(_))));
}

#[test]
fn run_settings_reject_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    std::fs::write(&path, "batch_sise = 10\n").unwrap();

    assert!(RunSettings::load(&path).is_err());
}
