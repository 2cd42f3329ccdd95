use codeintel_api_endpoint_validator::{Settings, Severity};
use std::env;
use std::fs;
use tempfile::TempDir;

// Env vars are process-wide, so every override case lives in one test.
#[test]
fn test_env_override_with_nested_keys() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("settings.toml");
    fs::write(
        &config_path,
        "[scan]\nparallel_threads = 2\ninclude_tests = true\n\n[validation]\nfail_on = \"error\"\n",
    )
    .unwrap();

    unsafe {
        // Double underscore separates nested levels
        env::set_var("CODEINTEL_SCAN__PARALLEL_THREADS", "42");
        env::set_var("CODEINTEL_SCAN__INCLUDE_TESTS", "false");
        env::set_var("CODEINTEL_VALIDATION__FAIL_ON", "warning");
        env::set_var("CODEINTEL_LOGGING__DEFAULT", "debug");
    }

    let settings = Settings::load_from(&config_path).unwrap();

    unsafe {
        env::remove_var("CODEINTEL_SCAN__PARALLEL_THREADS");
        env::remove_var("CODEINTEL_SCAN__INCLUDE_TESTS");
        env::remove_var("CODEINTEL_VALIDATION__FAIL_ON");
        env::remove_var("CODEINTEL_LOGGING__DEFAULT");
    }

    // Env wins over the file
    assert_eq!(settings.scan.parallel_threads, 42);
    assert!(!settings.scan.include_tests);
    assert_eq!(settings.validation.fail_on, Severity::Warning);
    assert_eq!(settings.logging.default, "debug");

    // Keys not set anywhere keep their defaults
    assert!(settings.validation.report_unimplemented);
    assert!(settings.languages["python"].enabled);

    let settings = Settings::load_from(&config_path).unwrap();
    assert_eq!(settings.scan.parallel_threads, 2);
    assert_eq!(settings.validation.fail_on, Severity::Error);
}
