use chrono_tz::Tz;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::env;
use std::fs;
use std::io;
use std::iter::FromIterator;
use std::path::{Path, PathBuf};

use crate::datekey::{DateResolver, DEFAULT_TIMEZONE};
use crate::error::*;

const CONFIG_PATH_ENV_VAR: &str = "PLANBOOK_CONFIG_FILE";
const APP_DIR_NAME: &str = "planbook";

pub(crate) fn find_configfile_locations() -> io::Result<Vec<PathBuf>> {
    let config_env: Option<PathBuf> = if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        Some(PathBuf::from(path))
    } else {
        None
    };

    let home = if let Ok(dir) = env::var("HOME") {
        PathBuf::from(dir)
    } else {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "Unable to find home directory",
        ));
    };

    let home_config = PathBuf::from_iter([&home, &PathBuf::from(".planbook.toml")].iter());

    let config_xdg = if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from_iter([dir, APP_DIR_NAME.to_string(), "config.toml".to_string()].iter())
    } else {
        PathBuf::from_iter(
            [
                home.as_path(),
                Path::new(".config"),
                Path::new(APP_DIR_NAME),
                Path::new("config.toml"),
            ]
            .iter(),
        )
    };

    let mut locations = vec![config_xdg, home_config];

    if let Some(path) = config_env {
        locations.insert(0, path);
    }

    Ok(locations)
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Timezone that decides which day is "today".
    #[serde_as(as = "DisplayFromStr")]
    pub timezone: Tz,
    /// Where snapshots are stored; platform data directory if unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            timezone: DEFAULT_TIMEZONE,
            data_dir: None,
        }
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            Error::from(err).with_msg(&format!("could not read '{}'", path.display()))
        })?;

        content.parse::<Config>().map_err(|err| {
            let msg = format!(
                "'{}': {}",
                path.display(),
                err.message.as_deref().unwrap_or_default()
            );
            err.with_msg(&msg)
        })
    }

    pub fn resolver(&self) -> DateResolver {
        DateResolver::new(self.timezone)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ConfigParse,
                    "no data directory configured and none found for this platform",
                )
            })
    }
}

/// Loads `path` if given, otherwise the first config file found in the
/// usual locations, otherwise the defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path);
    }

    for location in find_configfile_locations()? {
        if location.is_file() {
            log::debug!("Using config file '{}'", location.display());
            return Config::from_file(&location);
        }
    }

    log::debug!("No config file found, using defaults");
    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = "".parse().unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
    }

    #[test]
    fn config_and_resolver_share_default_timezone() {
        assert_eq!(Config::default().timezone, DEFAULT_TIMEZONE);
        assert_eq!(DateResolver::default().timezone(), DEFAULT_TIMEZONE);
        assert_eq!(Config::default().resolver(), DateResolver::default());
    }

    #[test]
    fn reads_timezone_and_data_dir() {
        let config: Config = r#"
            timezone = "Europe/Berlin"
            data_dir = "/tmp/planbook-test"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(
            config.data_dir().unwrap(),
            PathBuf::from("/tmp/planbook-test")
        );
        assert_eq!(config.resolver().timezone(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn rejects_unknown_timezone() {
        let err = r#"timezone = "Mars/Olympus_Mons""#.parse::<Config>().unwrap_err();

        assert!(matches!(err.kind, ErrorKind::ConfigParse));
    }

    #[test]
    fn explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timezone = \"Asia/Tokyo\"\n").unwrap();

        let config = load_suitable_config(Some(&path)).unwrap();
        assert_eq!(config.timezone, chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load_suitable_config(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
