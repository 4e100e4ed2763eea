/*!
Character records and the on-disk store they are loaded from.

Store layout: one file per character under a base directory, named after the
lookup key: `<dir>/<name>.json`, or `<name>.yaml` / `<name>.yml`.

Record shape (JSON):
{
  "name": "Gandalf",
  "system": "rolemaster",
  "strings": { "player": "Dave" },
  "stats":   { "strength": 75 },
  "skills":  { "channeling": 85 },
  "counts":  { "hit_points": [25, 45] }
}
Only `name` is required.
*/

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default = "default_system")]
    pub system: String,
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
    #[serde(default)]
    pub skills: BTreeMap<String, i64>,
    /// `(current, max)` pairs such as hit points.
    #[serde(default)]
    pub counts: BTreeMap<String, (i64, i64)>,
}

fn default_system() -> String {
    "generic".to_string()
}

impl Character {
    /// Multi-line human summary; empty sections are skipped.
    pub fn describe(&self) -> String {
        let mut out = format!("Name: {}\nSystem: {}", self.name, self.system);
        let sections: [(&str, Vec<String>); 4] = [
            ("Strings", render(&self.strings, |v| v.clone())),
            ("Stats", render(&self.stats, i64::to_string)),
            ("Skills", render(&self.skills, i64::to_string)),
            ("Counts", render(&self.counts, |(cur, max)| format!("{cur}/{max}"))),
        ];
        for (title, lines) in sections {
            if lines.is_empty() {
                continue;
            }
            let _ = write!(out, "\n{title}:");
            for line in lines {
                let _ = write!(out, "\n  {line}");
            }
        }
        out
    }
}

fn render<V>(map: &BTreeMap<String, V>, fmt_value: impl Fn(&V) -> String) -> Vec<String> {
    map.iter()
        .map(|(k, v)| format!("{k}: {}", fmt_value(v)))
        .collect()
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Character file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

#[derive(Debug, Clone)]
pub struct CharacterStore {
    base_dir: PathBuf,
}

impl Default for CharacterStore {
    fn default() -> Self {
        Self::new(default_dir())
    }
}

/// `~/.config/gg-cli/characters`, or a relative `characters` when no home is known.
pub fn default_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("gg-cli").join("characters"))
        .unwrap_or_else(|| PathBuf::from("characters"))
}

impl CharacterStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load the character stored under `name`, trying each known extension.
    pub fn load(&self, name: &str) -> Result<Character, StoreError> {
        let path = EXTENSIONS
            .iter()
            .map(|ext| self.base_dir.join(format!("{name}.{ext}")))
            .find(|p| p.is_file())
            .ok_or_else(|| StoreError::NotFound(self.base_dir.join(format!("{name}.json"))))?;

        let raw = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let parsed = if is_yaml {
            serde_yaml::from_str(&raw).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&raw).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| StoreError::Parse { path, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Character {
        Character {
            name: name.to_string(),
            system: default_system(),
            strings: BTreeMap::new(),
            stats: BTreeMap::new(),
            skills: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    fn write(dir: &Path, file: &str, body: &str) {
        std::fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn load_full_json_record() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "gandalf.json",
            r#"{
                "name": "Gandalf",
                "system": "rolemaster",
                "strings": {"player": "Dave"},
                "stats": {"strength": 75},
                "skills": {"channeling": 85},
                "counts": {"hit_points": [25, 45]}
            }"#,
        );

        let store = CharacterStore::new(dir.path());
        let c = store.load("gandalf").unwrap();
        assert_eq!(c.name, "Gandalf");
        assert_eq!(c.system, "rolemaster");
        assert_eq!(c.strings["player"], "Dave");
        assert_eq!(c.counts["hit_points"], (25, 45));
    }

    #[test]
    fn load_minimal_record_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "frodo.json", r#"{"name": "Frodo"}"#);

        let c = CharacterStore::new(dir.path()).load("frodo").unwrap();
        assert_eq!(c, named("Frodo"));
    }

    #[test]
    fn load_yaml_record() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "sam.yaml", "name: Sam\nstats:\n  strength: 60\n");

        let c = CharacterStore::new(dir.path()).load("sam").unwrap();
        assert_eq!(c.stats["strength"], 60);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = CharacterStore::new(dir.path()).load("nobody").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(err.to_string().starts_with("Character file not found:"));
        assert!(err.to_string().contains("nobody.json"));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.json", "{ not json");
        let err = CharacterStore::new(dir.path()).load("bad").unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn describe_skips_empty_sections() {
        let mut c = named("Gandalf");
        c.stats.insert("strength".into(), 75);
        c.counts.insert("hit_points".into(), (25, 45));

        let text = c.describe();
        assert_eq!(
            text,
            "Name: Gandalf\nSystem: generic\nStats:\n  strength: 75\nCounts:\n  hit_points: 25/45"
        );
        assert!(!text.contains("Skills"));
    }
}
