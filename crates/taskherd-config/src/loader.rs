//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load(path)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        config.jobs.dir = Self::expand_path_buf(&config.jobs.dir);
        config.logging.dir = config.logging.dir.as_deref().map(Self::expand_path_buf);
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Text after a `#` that is not inside a quoted string is a comment and
    /// is copied through untouched.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
            field: "env substitution".to_string(),
            message: e.to_string(),
        })?;

        let mut result = String::with_capacity(content.len());
        for line in content.split_inclusive('\n') {
            let (code, comment) = line.split_at(comment_start(line));
            let mut last = 0;
            for m in re.find_iter(code) {
                let var_name = &code[m.start() + 2..m.end() - 1];
                let var_value = std::env::var(var_name)
                    .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                result.push_str(&code[last..m.start()]);
                result.push_str(&var_value);
                last = m.end();
            }
            result.push_str(&code[last..]);
            result.push_str(comment);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/jobs`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }
}

/// Byte offset where the line's comment starts, or the line length.
fn comment_start(line: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '#' => return i,
            None if c == '"' || c == '\'' => quote = Some(c),
            None => {}
        }
    }
    line.len()
}
