use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// Load and validate a generation plan from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading plan from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open plan file '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse plan file '{}'", config_path.display()))?;

    info!("Plan contains {} job(s)", config.jobs.len());

    config.validate()?;

    Ok(config)
}

/// Peek at the plan's log level without validating the rest of the file.
///
/// Used before logging is initialised, so failures are swallowed and the
/// caller falls back to its default filter.
pub fn peek_log_level(config_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(config_path).ok()?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content).ok()?;
    value
        .get("general")?
        .get("log_level")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_plan() {
        let yaml = r#"
general:
  log_level: debug
tool:
  config_path: ./network
jobs:
  - type: genesis_block
    profile: TwoOrgsOrdererGenesis
    output: ./artifacts/genesis.block
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.jobs.len(), 1);
        assert_eq!(config.tool.config_path.as_deref(), Some("./network"));
        assert_eq!(peek_log_level(temp_file.path()).as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_invalid_plan() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "jobs: []\n").unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("no jobs"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/plan.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to open plan file"));
    }

    #[test]
    fn test_peek_log_level_missing() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "jobs:\n  - type: version\n").unwrap();
        assert_eq!(peek_log_level(temp_file.path()), None);
    }
}
