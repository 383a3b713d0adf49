use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layout_engine::{
    DEFAULT_SPLIT_PERCENTAGE, InsertionMode, InsertionPosition, LayoutConfig,
};

const MAX_INITIAL_WORKSPACES: usize = 32;

pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::config_dir().context("no config directory for this user")?.join("tessera"))
}

pub fn data_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::data_dir().context("no data directory for this user")?.join("tessera"))
}

pub fn config_file() -> anyhow::Result<PathBuf> { Ok(config_dir()?.join("tessera.toml")) }

pub fn snapshot_file() -> anyhow::Result<PathBuf> { Ok(data_dir()?.join("state.json")) }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutSettings,
    #[serde(default)]
    pub workspaces: WorkspaceSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    #[serde(default)]
    pub insertion_mode: InsertionMode,
    #[serde(default = "default_split_percentage")]
    pub split_percentage: f64,
    #[serde(default)]
    pub insertion_position: InsertionPosition,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceSettings {
    /// One workspace is created per entry when a fresh state is initialized.
    /// Empty strings leave that workspace unlabeled.
    #[serde(default)]
    pub initial_labels: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            insertion_mode: InsertionMode::default(),
            split_percentage: default_split_percentage(),
            insertion_position: InsertionPosition::default(),
        }
    }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Err(err) = self.to_layout_config().validate() {
            issues.push(err.to_string());
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        if self.to_layout_config().validate().is_ok() {
            return 0;
        }
        self.split_percentage = DEFAULT_SPLIT_PERCENTAGE;
        1
    }

    pub fn to_layout_config(&self) -> LayoutConfig {
        LayoutConfig::new(self.insertion_mode, self.split_percentage, self.insertion_position)
    }
}

impl WorkspaceSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.initial_labels.len() > MAX_INITIAL_WORKSPACES {
            issues.push(format!(
                "initial_labels should not list more than {MAX_INITIAL_WORKSPACES} workspaces"
            ));
        }

        let mut seen = crate::common::collections::HashSet::default();
        for (index, label) in self.initial_labels.iter().enumerate() {
            if label.trim() != label {
                issues.push(format!("label {index} ('{label}') has surrounding whitespace"));
            }
            if !label.is_empty() && !seen.insert(label) {
                issues.push(format!("duplicate label '{label}' at {index}"));
            }
        }
        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;
        if self.initial_labels.len() > MAX_INITIAL_WORKSPACES {
            self.initial_labels.truncate(MAX_INITIAL_WORKSPACES);
            fixes += 1;
        }
        for label in &mut self.initial_labels {
            let trimmed = label.trim();
            if trimmed != label {
                *label = trimmed.to_string();
                fixes += 1;
            }
        }
        fixes
    }

    /// Labels in the shape `AppState::with_workspaces` takes.
    pub fn labels(&self) -> Vec<Option<String>> {
        self.initial_labels
            .iter()
            .map(|label| (!label.is_empty()).then(|| label.clone()))
            .collect()
    }
}

fn default_split_percentage() -> f64 { DEFAULT_SPLIT_PERCENTAGE }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf).with_context(|| format!("parsing {}", path.display()))
    }

    /// Reads `path` if it exists, otherwise falls back to the defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.layout.validate());
        issues.extend(self.workspaces.validate());
        issues
    }

    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        self.layout.auto_fix_values() + self.workspaces.auto_fix_values()
    }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}
