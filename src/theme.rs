use derive_more::Display;
use std::str::FromStr;

use crate::error::*;

/// Appearance preference. Persisted as the bare words `light` or `dark`.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum Theme {
    #[default]
    #[display(fmt = "light")]
    Light,
    #[display(fmt = "dark")]
    Dark,
}

impl Theme {
    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Anything other than `dark` reads as the light theme.
    pub fn from_snapshot(blob: Option<&str>) -> Self {
        match blob.map(str::trim) {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(Error::new(
                ErrorKind::InvalidTheme,
                &format!("'{}' is neither light nor dark", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles() {
        assert!(Theme::Light.toggled().is_dark());
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn snapshot_values() {
        assert_eq!(Theme::from_snapshot(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_snapshot(Some("light")), Theme::Light);
        assert_eq!(Theme::from_snapshot(Some("\"dark\"")), Theme::Light);
        assert_eq!(Theme::from_snapshot(None), Theme::Light);
        assert_eq!(Theme::Dark.to_string(), "dark");
    }
}
