//! Configuration loading integration tests
//!
//! Exercise the public loading surface: YAML files, defaults, and
//! validation at load time.

#[cfg(test)]
mod tests {
    use crate::{assert_err, assert_ok};
    use std::io::Write as _;
    use tempfile::NamedTempFile;
    use woundsight_core::Config;

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", yaml).unwrap();
        file
    }

    // ==================== File Loading ====================

    /// Test that an explicit path wins and unset sections keep defaults
    #[tokio::test]
    async fn test_load_from_explicit_path() {
        let file = write_config(
            r#"
http:
  base_url: "http://backend.internal:9000"
retry:
  max_attempts: 5
"#,
        );

        let config = assert_ok!(Config::load(Some(file.path())).await);
        assert_eq!(config.http.base_url, "http://backend.internal:9000");
        assert_eq!(config.retry.max_attempts, 5);
        // Untouched sections fall back to defaults
        assert_eq!(config.cache.max_size, 100);
        assert_eq!(config.logging.level, "info");
    }

    /// Test that malformed YAML is rejected with a parse error
    #[tokio::test]
    async fn test_malformed_yaml_rejected() {
        let file = write_config("http: [");
        let err = assert_err!(Config::from_file(file.path()).await);
        assert!(err.to_string().contains("Failed to parse config"));
    }

    /// Test that a syntactically valid but invalid config fails load
    #[tokio::test]
    async fn test_invalid_values_rejected_at_load() {
        let file = write_config(
            r#"
retry:
  max_attempts: 0
"#,
        );
        let err = assert_err!(Config::load(Some(file.path())).await);
        assert!(err.to_string().contains("Retry config error"));
    }

    /// Test that a missing file surfaces a readable error
    #[tokio::test]
    async fn test_missing_file_rejected() {
        let err = assert_err!(Config::from_file("/nonexistent/woundsight.yaml").await);
        assert!(err.to_string().contains("Failed to read config file"));
    }

    // ==================== Serialization ====================

    /// Test that the default config round-trips through YAML
    #[test]
    fn test_default_config_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.http.base_url, config.http.base_url);
        assert_eq!(parsed.retry.max_attempts, config.retry.max_attempts);
        assert_eq!(parsed.cache.max_size, config.cache.max_size);
        assert_eq!(parsed.health.endpoints, config.health.endpoints);
        assert_eq!(
            parsed.analysis.base_timeout_ms,
            config.analysis.base_timeout_ms
        );
        assert!(parsed.validate().is_ok());
    }
}
