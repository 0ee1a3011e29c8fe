use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;
use triageboard::config::ConfigLoader;

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    unsafe {
        env::remove_var("TRIAGE_PROFILE");
        env::remove_var("TRIAGE_API_BIND_ADDR");
        env::remove_var("TRIAGE_LOG_LEVEL");
        env::remove_var("TRIAGE_MANUAL_CAPACITY");
        env::remove_var("TRIAGE_AUTOMATIC_CAPACITY");
        env::remove_var("TRIAGE_AI_API_BASE");
        env::remove_var("TRIAGE_AI_API_KEY");
        env::remove_var("TRIAGE_DATASET_PATH");
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let empty_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::with_base_dir(PathBuf::from(empty_dir.path()));
    let cfg = loader.load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.manual_capacity, 10);
    assert_eq!(cfg.automatic_capacity, 5);
    assert!(cfg.dataset_path.is_none());
    cfg.bind_addr().expect("default bind addr parses");
    clear_env();
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "TRIAGE_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(
        &temp_dir,
        ".env.test",
        "TRIAGE_API_BIND_ADDR=192.168.0.10:5000\nTRIAGE_MANUAL_CAPACITY=12\n",
    );
    write_env_file(
        &temp_dir,
        ".env.test.local",
        "TRIAGE_API_BIND_ADDR=10.0.0.5:6000\n",
    );

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "TRIAGE_PROFILE=test\nTRIAGE_API_BIND_ADDR=127.0.0.1:4000\n",
    );

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
    assert_eq!(cfg.manual_capacity, 12);
    clear_env();
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "TRIAGE_API_BIND_ADDR=127.0.0.1:3000\n");

    unsafe {
        env::set_var("TRIAGE_API_BIND_ADDR", "0.0.0.0:9090");
    }

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let cfg = loader.load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("TRIAGE_API_BIND_ADDR", "not-an-addr");
    }
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn zero_capacity_fails_validation() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    unsafe {
        env::set_var("TRIAGE_MANUAL_CAPACITY", "0");
    }
    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("zero capacity should fail");
    assert!(format!("{}", err).contains("capacity"));

    clear_env();
}

#[test]
fn non_local_profile_requires_an_ai_key() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "TRIAGE_PROFILE=production\n");

    let loader = ConfigLoader::with_base_dir(PathBuf::from(temp_dir.path()));
    let err = loader.load().expect_err("production without a key should fail");
    assert!(format!("{}", err).contains("AI api key"));

    // The same profile with a key passes.
    unsafe {
        env::set_var("TRIAGE_AI_API_KEY", "sk-test-key");
    }
    let cfg = loader.load().expect("production with a key loads");
    assert_eq!(cfg.profile, "production");
    assert_eq!(cfg.ai.api_key.as_deref(), Some("sk-test-key"));

    clear_env();
}
