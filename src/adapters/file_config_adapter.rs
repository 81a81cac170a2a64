//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// A config with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[ledger]
data_file = items_data_v2.json
auxiliary_unit_cost = 25

[feed]
league = Settlers
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("ledger", "data_file"),
            Some("items_data_v2.json".to_string())
        );
        assert_eq!(adapter.get_string("feed", "league"), Some("Settlers".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[ledger]\ndata_file = a.json\n").unwrap();
        assert_eq!(adapter.get_string("ledger", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn empty_adapter_has_no_values() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("ledger", "data_file"), None);
        assert_eq!(adapter.get_double("ledger", "auxiliary_unit_cost", 3.0), 3.0);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter =
            FileConfigAdapter::from_string("[ledger]\nauxiliary_unit_cost = 25.5\n").unwrap();
        assert_eq!(adapter.get_double("ledger", "auxiliary_unit_cost", 0.0), 25.5);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[display]\n").unwrap();
        assert_eq!(adapter.get_double("display", "highlight_high", 2000.0), 2000.0);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[display]\nhighlight_high = lots\n").unwrap();
        assert_eq!(adapter.get_double("display", "highlight_high", 2000.0), 2000.0);
    }

    #[test]
    fn get_bool_returns_true_values() {
        let adapter =
            FileConfigAdapter::from_string("[export]\na = true\nb = yes\nc = 1\n").unwrap();
        assert!(adapter.get_bool("export", "a", false));
        assert!(adapter.get_bool("export", "b", false));
        assert!(adapter.get_bool("export", "c", false));
    }

    #[test]
    fn get_bool_returns_false_values() {
        let adapter =
            FileConfigAdapter::from_string("[export]\na = false\nb = no\nc = 0\n").unwrap();
        assert!(!adapter.get_bool("export", "a", true));
        assert!(!adapter.get_bool("export", "b", true));
        assert!(!adapter.get_bool("export", "c", true));
    }

    #[test]
    fn get_list_splits_and_trims() {
        let adapter =
            FileConfigAdapter::from_string("[feed]\nitem_types = Fragment, Scarab,,Oil\n").unwrap();
        assert_eq!(
            adapter.get_list("feed", "item_types"),
            Some(vec!["Fragment".to_string(), "Scarab".to_string(), "Oil".to_string()])
        );
        assert_eq!(adapter.get_list("feed", "missing"), None);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[export]\nbom = false\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert!(!adapter.get_bool("export", "bom", true));
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/flipledger.ini");
        assert!(result.is_err());
    }
}
