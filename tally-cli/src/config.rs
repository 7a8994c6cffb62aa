use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::RuleSet;
use tally_ingest::DetectionOptions;

use crate::state::{ensure_tally_home, tally_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Optional TOML rule set replacing the built-in field and column rules.
    pub rules_file: Option<PathBuf>,
    pub output: OutputSection,
    pub detection: DetectionOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputSection {
    pub write_json: bool,
    pub write_csv: bool,
    pub write_summary_pdf: bool,
    /// Prefix for amounts in summaries.
    pub currency_symbol: String,
    /// Where reports go; defaults to the statement's directory.
    pub out_dir: Option<PathBuf>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            write_json: true,
            write_csv: false,
            write_summary_pdf: false,
            currency_symbol: "$".to_string(),
            out_dir: None,
        }
    }
}

/// Location of the config file; nothing is created.
pub fn config_path() -> Result<PathBuf> {
    Ok(tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Reads a config file, or returns defaults when it does not exist.
pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_tally_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse rules {}", path.display()))
}

/// Rules from `--rules`, then `rules_file`, then the built-in set.
pub fn resolve_rules(cli_rules: Option<&Path>, cfg: &Config) -> Result<RuleSet> {
    match cli_rules.or(cfg.rules_file.as_deref()) {
        Some(path) => {
            log::info!("using rules from {}", path.display());
            load_rules(path)
        }
        None => Ok(RuleSet::default()),
    }
}
