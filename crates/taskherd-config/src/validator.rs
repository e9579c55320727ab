//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error, if any, into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_daemon(config, &mut result);
        Self::validate_jobs(config, &mut result);
        Self::validate_logging(config, &mut result);
        Self::validate_alerting(config, &mut result);

        Ok(result)
    }

    fn validate_daemon(config: &Config, result: &mut ValidationResult) {
        if config.daemon.environment.trim().is_empty() {
            result.add_error(ValidationError::new(
                "daemon.environment",
                "environment cannot be empty",
            ));
        }

        if config.daemon.shutdown_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "daemon.shutdown_timeout_secs",
                "shutdown_timeout_secs must be greater than 0",
            ));
        }

        if config.daemon.production_like.is_empty() {
            result.add_warning(ValidationWarning::new(
                "daemon.production_like",
                "no production-like environments configured, failures will never alert",
            ));
        }
    }

    fn validate_jobs(config: &Config, result: &mut ValidationResult) {
        if config.jobs.pattern.trim().is_empty() {
            result.add_error(ValidationError::new(
                "jobs.pattern",
                "pattern cannot be empty",
            ));
        }

        if !config.jobs.dir.exists() {
            result.add_warning(ValidationWarning::new(
                "jobs.dir",
                format!("Job directory does not exist: {:?}", config.jobs.dir),
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "level cannot be empty",
            ));
        }
    }

    fn validate_alerting(config: &Config, result: &mut ValidationResult) {
        if let Some(ref url) = config.alerting.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "alerting.webhook_url",
                    "webhook_url must start with http:// or https://",
                ));
            }
        }

        if config.alerting.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "alerting.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        if !config.alerting.headers.is_empty() && config.alerting.webhook_url.is_none() {
            result.add_warning(ValidationWarning::new(
                "alerting.headers",
                "headers are set but no webhook_url is configured",
            ));
        }

        if config.alerting.alert_on_discovery_failure && config.alerting.webhook_url.is_none() {
            result.add_warning(ValidationWarning::new(
                "alerting.alert_on_discovery_failure",
                "discovery alerts requested but no webhook_url is set",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
