use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
}

#[test]
fn test_validate_empty_environment() {
    let mut config = Config::default();
    config.daemon.environment = "  ".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "daemon.environment"));
}

#[test]
fn test_validate_zero_shutdown_timeout() {
    let mut config = Config::default();
    config.daemon.shutdown_timeout_secs = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "daemon.shutdown_timeout_secs"));
}

#[test]
fn test_validate_no_production_like_warns() {
    let mut config = Config::default();
    config.daemon.production_like.clear();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "daemon.production_like"));
}

#[test]
fn test_validate_missing_jobs_dir_warns() {
    let mut config = Config::default();
    config.jobs.dir = "/nonexistent/taskherd/jobs".into();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "jobs.dir"));
}

#[test]
fn test_validate_empty_pattern() {
    let mut config = Config::default();
    config.jobs.pattern = String::new();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "jobs.pattern"));
}

#[test]
fn test_validate_bad_webhook_url() {
    let mut config = Config::default();
    config.alerting.webhook_url = Some("hooks.example.com".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "alerting.webhook_url"));
}

#[test]
fn test_validate_zero_alert_timeout() {
    let mut config = Config::default();
    config.alerting.timeout_secs = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "alerting.timeout_secs"));
}

#[test]
fn test_headers_without_webhook_warns() {
    let mut config = Config::default();
    config
        .alerting
        .headers
        .insert("x-team".to_string(), "ops".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.is_empty());
    assert!(result.warnings.iter().any(|w| w.path == "alerting.headers"));
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.daemon.shutdown_timeout_secs = 0;

    let err = ConfigValidator::validate(&config)
        .unwrap()
        .into_result()
        .unwrap_err();
    assert!(err.to_string().contains("daemon.shutdown_timeout_secs"));

    let warnings = ConfigValidator::validate(&Config::default())
        .unwrap()
        .into_result()
        .unwrap();
    assert!(warnings.iter().all(|w| w.path != "daemon.shutdown_timeout_secs"));
}
