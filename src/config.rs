use serde::Deserialize;
use std::path::PathBuf;

use crate::types::SortField;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub clone: CloneConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            sort: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CloneConfig {
    /// Directory repos are cloned into. None means gh's default (cwd).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_limit() -> u32 {
    20
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("ghx").join("config.toml"))
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        toml::from_str::<Config>(&content).unwrap_or_default()
    }

    /// Configured sort, if it names a valid field. Bad values are ignored
    /// rather than fatal.
    pub fn default_sort(&self) -> Option<SortField> {
        match self.search.sort.as_deref() {
            Some("stars") => Some(SortField::Stars),
            Some("forks") => Some(SortField::Forks),
            Some("updated") => Some(SortField::Updated),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[search]
limit = 50
sort = "updated"

[clone]
dir = "/home/me/src"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.search.limit, 50);
        assert_eq!(config.default_sort(), Some(SortField::Updated));
        assert_eq!(config.clone.dir.as_deref(), Some(std::path::Path::new("/home/me/src")));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.search.limit, 20);
        assert!(config.search.sort.is_none());
        assert!(config.clone.dir.is_none());
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: Config = toml::from_str("[search]\nsort = \"stars\"\n").unwrap();
        assert_eq!(config.search.limit, 20);
        assert_eq!(config.default_sort(), Some(SortField::Stars));
    }

    #[test]
    fn unknown_sort_ignored() {
        let config: Config = toml::from_str("[search]\nsort = \"velocity\"\n").unwrap();
        assert_eq!(config.default_sort(), None);
    }
}
