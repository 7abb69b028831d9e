use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Partition order for aggregation. Grouped by faculty: engineering, math,
/// science, health, environment, arts, then the rest.
#[rustfmt::skip]
pub const DEFAULT_DEPARTMENTS: &[&str] = &[
    "AE", "BME", "CHE", "CIVE", "ECE", "ME", "MSCI", "MSE", "MTE", "NE", "SE", "SYDE",
    "AMATH", "ACTSC", "CO", "CS", "MATH", "STAT",
    "ASTRN", "BIOL", "CHEM", "EARTH", "OPTOM", "PHYS", "SCBUS", "SCI",
    "HEALTH", "HLTH", "KIN", "PHS", "REC",
    "ERS", "GEOG", "INTEG", "PLAN",
    "AFM", "APPLS", "ANTH", "BLKST", "CLAS", "COMMST", "EASIA", "ECON", "EMLS", "ENGL", "FINE",
    "FR", "GER", "GBDA", "GSJ", "GGOV", "HIST", "ISS", "ITAL", "ITALST", "JS", "LS", "MEDVL",
    "MUSIC", "PACS", "PHIL", "PSCI", "PSYCH", "RS", "SDS", "SMF", "SOC", "SOCWK", "SWK", "SWREN",
    "SPAN", "TS",
    "BET", "PD", "SAF", "ARCH", "DAC", "ENBUS", "SFM",
];

pub const DEFAULT_INVALID_EMAILS: &[&str] = &["a6lian@uwaterloo.ca"];

/// Loaded once at start-up and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub departments: Vec<String>,
    pub invalid_emails: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            departments: DEFAULT_DEPARTMENTS.iter().map(|s| s.to_string()).collect(),
            invalid_emails: DEFAULT_INVALID_EMAILS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// Built-in defaults, overlaid with a JSON file when one is given. Keys
    /// missing from the file keep their defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
        let cfg: Config = serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.to_string_lossy()))?;
        Ok(cfg)
    }

    pub fn scrape_dir(&self) -> PathBuf {
        scrape_dir(&self.output_dir)
    }

    pub fn final_dir(&self) -> PathBuf {
        final_dir(&self.output_dir)
    }

    pub fn has_department(&self, code: &str) -> bool {
        self.departments.iter().any(|d| d == code)
    }
}

pub fn scrape_dir(root: &Path) -> PathBuf {
    root.join("scrape")
}

pub fn final_dir(root: &Path) -> PathBuf {
    root.join("final")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_cover_known_departments() {
        let cfg = Config::default();
        assert_eq!(cfg.departments.first().map(String::as_str), Some("AE"));
        assert!(cfg.has_department("ECE"));
        assert!(!cfg.has_department("ece"));
        assert_eq!(cfg.final_dir(), PathBuf::from("./output").join("final"));
    }

    #[test]
    fn file_overrides_only_given_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("outlined.json");
        std::fs::write(&path, r#"{ "departments": ["ECE", "SE"] }"#).expect("write");

        let cfg = Config::load(Some(&path)).expect("load");
        assert_eq!(cfg.departments, vec!["ECE", "SE"]);
        assert_eq!(cfg.invalid_emails, Config::default().invalid_emails);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").expect("write");
        assert!(Config::load(Some(&path)).is_err());
    }
}
