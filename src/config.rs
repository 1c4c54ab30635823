//! Configuration management

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub report: ReportConfig,
    pub geoip: GeoIpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Directory tree copied into every report (stylesheets, scripts)
    pub template_dir: PathBuf,
    /// Parent of generated `report_<timestamp>` directories when `--dir` is absent
    pub output_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoIpConfig {
    pub database: PathBuf,
    /// Locale used for country and city names, e.g. `zh-CN` or `en`
    pub locale: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

pub const DEFAULT_CONFIG_PATH: &str = "loganalysis.toml";

impl Config {
    /// Defaults, then the optional config file, then `LOGANALYSIS__*` env vars
    pub fn load(config_path: &str) -> Result<Self> {
        let builder = config::Config::builder()
            .set_default("report.template_dir", "tpl")?
            .set_default("report.output_root", "reports")?
            .set_default("geoip.database", "db/GeoLite2-City.mmdb")?
            .set_default("geoip.locale", "zh-CN")?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("LOGANALYSIS").separator("__"));

        let settings = builder.build()?;
        let config: Config = settings.try_deserialize()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.report.template_dir.as_os_str().is_empty() {
            anyhow::bail!("Report template_dir cannot be empty");
        }
        if self.report.output_root.as_os_str().is_empty() {
            anyhow::bail!("Report output_root cannot be empty");
        }

        if self.geoip.database.as_os_str().is_empty() {
            anyhow::bail!("GeoIP database path cannot be empty");
        }
        if self.geoip.locale.is_empty() {
            anyhow::bail!("GeoIP locale cannot be empty");
        }

        // Validate logging level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid logging level '{}'. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load("/nonexistent/loganalysis").unwrap();
        assert_eq!(config.report.template_dir, PathBuf::from("tpl"));
        assert_eq!(config.report.output_root, PathBuf::from("reports"));
        assert_eq!(config.geoip.database, PathBuf::from("db/GeoLite2-City.mmdb"));
        assert_eq!(config.geoip.locale, "zh-CN");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[geoip]\nlocale = \"en\"\n\n[report]\ntemplate_dir = \"assets\""
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.geoip.locale, "en");
        assert_eq!(config.report.template_dir, PathBuf::from("assets"));
        assert_eq!(config.report.output_root, PathBuf::from("reports"));
    }

    #[test]
    fn test_invalid_level_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"loud\"").unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_empty_locale_rejected() {
        let config = Config {
            report: ReportConfig {
                template_dir: "tpl".into(),
                output_root: "reports".into(),
            },
            geoip: GeoIpConfig {
                database: "db/GeoLite2-City.mmdb".into(),
                locale: String::new(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        };
        assert!(config.validate().is_err());
    }
}
