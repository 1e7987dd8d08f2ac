//! Configuration loader.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        let expanded = Self::expand_env_vars(&content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration, seeding a default file first when none exists.
    pub fn load_or_init(path: &Path) -> Result<Config, ConfigError> {
        Self::ensure_default_file(path)?;
        Self::load(path)
    }

    /// Write a commented default configuration file unless one exists.
    pub fn ensure_default_file(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, Self::default_file_contents())?;
        Ok(())
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_VAR_RE.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.config`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    fn default_file_contents() -> &'static str {
        r#"[server]
host = "127.0.0.1"
port = 3000
app_root = "src"

[logging]
directory = "./logs"
debug = false

[http]
disabled = false
body_limit = 104857600

[socket]
disabled = false

[scheduler]
disabled = false

[events]
disabled = false
timeout_ms = 30000

# The services below register only when configured.

[database]
# url = "sqlite://bootsmith.db"

[cache]
# url = "memory://"

[storage]
# root = "./storage"

[queue]
# queues = ["default"]
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_expand_path() {
        let expanded = ConfigLoader::expand_path("~/.bootsmith");
        assert!(!expanded.starts_with('~'));
    }

    #[test]
    fn test_load_basic_config() {
        let content = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_feature_flags() {
        let content = r#"
            [socket]
            disabled = true

            [database]
            url = "sqlite://app.db"

            [queue]
            queues = ["mail", "reports"]
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert!(config.socket.disabled);
        assert_eq!(config.database.url.as_deref(), Some("sqlite://app.db"));
        assert_eq!(config.queue.queues, vec!["mail", "reports"]);
    }

    #[test]
    fn test_env_var_expansion() {
        unsafe { std::env::set_var("BOOTSMITH_TEST_PORT", "4500") };
        let config = ConfigLoader::load_str("[server]\nport = ${BOOTSMITH_TEST_PORT}").unwrap();
        assert_eq!(config.server.port, 4500);
    }

    #[test]
    fn test_env_var_missing() {
        let result = ConfigLoader::load_str("[server]\nhost = \"${BOOTSMITH_NO_SUCH_VAR}\"");
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();
        writeln!(file, "port = 5000").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootsmith.toml");

        ConfigLoader::ensure_default_file(&path).unwrap();
        assert!(path.exists());

        // Seeded file parses back to defaults.
        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_ensure_default_file_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootsmith.toml");
        fs::write(&path, "[server]\nport = 9999\n").unwrap();

        ConfigLoader::ensure_default_file(&path).unwrap();
        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.server.port, 9999);
    }
}
