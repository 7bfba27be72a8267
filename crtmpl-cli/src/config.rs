use std::collections::BTreeMap;
use std::env;
#[cfg(feature = "toml")]
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Holds in-memory config state for the execution.
///
/// Values are layered: defaults, then the config file, then environment
/// variables and finally the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    format: String,
    newline: bool,
    defines: BTreeMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: "auto".to_string(),
            newline: true,
            defines: Default::default(),
        }
    }
}

impl Config {
    /// Loads the config with all layers applied.
    pub fn load(matches: &ArgMatches) -> Result<Config, Error> {
        #[cfg(feature = "toml")]
        let mut config = match config_file_path(matches) {
            (Some(path), explicit) if explicit || path.is_file() => Config::load_from_toml(&path)
                .with_context(|| format!("unable to load config file '{}'", path.display()))?,
            _ => Config::default(),
        };
        #[cfg(not(feature = "toml"))]
        let mut config = Config::default();

        config.update_from_env()?;
        config.update_from_matches(matches)?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn load_from_toml(p: &Path) -> Result<Config, Error> {
        let contents = std::fs::read_to_string(p)?;
        let cfg: Config = toml::from_str(&contents)?;
        Ok(cfg)
    }

    pub fn update_from_env(&mut self) -> Result<(), Error> {
        if let Ok(format) = env::var("CRTMPL_FORMAT") {
            self.format = format;
        }
        if let Ok(newline) = env::var("CRTMPL_NEWLINE") {
            self.newline = parse_env_bool(&newline, "CRTMPL_NEWLINE")?;
        }
        Ok(())
    }

    pub fn update_from_matches(&mut self, matches: &ArgMatches) -> Result<(), Error> {
        if let Some(format) = matches.get_one::<String>("format") {
            self.format = format.clone();
        }
        if matches.get_flag("no-newline") {
            self.newline = false;
        }
        self.add_defines_from_matches(matches)?;
        Ok(())
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn newline(&self) -> bool {
        self.newline
    }

    pub fn defines(&self) -> &BTreeMap<String, Value> {
        &self.defines
    }

    fn add_defines_from_matches(&mut self, matches: &ArgMatches) -> Result<(), Error> {
        if let Some(items) = matches.get_many::<String>("define") {
            for item in items {
                if let Some((key, raw_value)) = item.split_once(":=") {
                    self.defines
                        .insert(key.to_string(), interpret_raw_value(raw_value)?);
                } else if let Some((key, string_value)) = item.split_once('=') {
                    self.defines
                        .insert(key.to_string(), Value::from(string_value));
                } else {
                    self.defines.insert(item.to_string(), Value::from(true));
                }
            }
        }
        Ok(())
    }
}

/// Returns the config file to load and whether it was requested explicitly.
#[cfg(feature = "toml")]
fn config_file_path(matches: &ArgMatches) -> (Option<PathBuf>, bool) {
    if let Some(path) = matches.get_one::<PathBuf>("config-file") {
        (Some(path.clone()), true)
    } else if let Some(path) = env::var_os("CRTMPL_CONFIG_FILE") {
        (Some(PathBuf::from(path)), true)
    } else {
        (home::home_dir().map(|x| x.join(".crtmpl.toml")), false)
    }
}

fn interpret_raw_value(s: &str) -> Result<Value, Error> {
    #[cfg(not(feature = "yaml"))]
    mod imp {
        pub use serde_json::from_str;
        pub const FMT: &str = "JSON";
    }
    #[cfg(feature = "yaml")]
    mod imp {
        pub use serde_yaml::from_str;
        pub const FMT: &str = "JSON/YAML";
    }
    imp::from_str::<Value>(s)
        .with_context(|| format!("invalid raw value '{}' (not valid {})", s, imp::FMT))
}

fn parse_env_bool(s: &str, var_name: &str) -> Result<bool, Error> {
    match s.to_lowercase().as_str() {
        "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => bail!("Invalid boolean value for {}: {}", var_name, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_bool() {
        assert!(parse_env_bool("YES", "X").unwrap());
        assert!(!parse_env_bool("off", "X").unwrap());
        assert_eq!(
            parse_env_bool("maybe", "CRTMPL_NEWLINE")
                .unwrap_err()
                .to_string(),
            "Invalid boolean value for CRTMPL_NEWLINE: maybe"
        );
    }

    #[test]
    fn test_raw_values() {
        assert_eq!(interpret_raw_value("42").unwrap(), Value::from(42));
        assert_eq!(
            interpret_raw_value("[1, true]").unwrap(),
            serde_json::json!([1, true])
        );
        assert!(interpret_raw_value("{").is_err());
    }

    #[test]
    fn test_defines_from_matches() {
        let matches = crate::command::make_command()
            .try_get_matches_from(["crtmpl-cli", "-Dcolor=red", "-Dwidth:=80", "-Ddraft"])
            .unwrap();
        let mut config = Config::default();
        config.update_from_matches(&matches).unwrap();
        assert_eq!(config.defines()["color"], Value::from("red"));
        assert_eq!(config.defines()["width"], Value::from(80));
        assert_eq!(config.defines()["draft"], Value::from(true));
        assert!(config.newline());
    }
}
