//! Layered configuration: built-in defaults, an optional `mensura.toml` in
//! the working directory, an explicit `--config` file, then `MENSURA__*`
//! environment variables (`.env` files are honoured).

use std::path::Path;

use mensura_units::Locale;
use serde::Deserialize;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Locale tag used for number formats and unit spellings.
    pub locale: String,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub json: bool,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .set_default("locale", "invariant")?
            .set_default("logging.level", "warn")?
            .set_default("logging.json", false)?
            .set_default("output.json", false)?
            .add_source(config::File::with_name("mensura").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(
                config::Environment::with_prefix("MENSURA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        Locale::parse(&self.locale).map_err(|e| format!("locale: {e}"))?;
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(format!(
                "logging.level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.logging.level
            ));
        }
        Ok(())
    }

    pub fn locale(&self) -> Result<Locale, String> {
        Locale::parse(&self.locale).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(locale: &str, level: &str) -> Config {
        Config {
            locale: locale.to_string(),
            logging: LoggingConfig {
                level: level.to_string(),
                json: false,
            },
            output: OutputConfig { json: false },
        }
    }

    #[test]
    fn accepts_defaults() {
        assert!(config("invariant", "warn").validate().is_ok());
        assert!(config("de_DE.UTF-8", "DEBUG").validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config("x", "warn").validate().is_err());
        assert!(config("en", "loud").validate().is_err());
    }
}
