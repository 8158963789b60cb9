//! Configuration types for desgraph.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field is optional and falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`CheckConfig`] - Controls how strictly warnings are treated.
//! - [`DumpConfig`] - Controls the Graphviz DOT output.
//!
//! # Example
//!
//! ```
//! # use desgraph::config::{AppConfig, RankDir};
//! let config = AppConfig::default();
//! assert!(!config.check().deny_warnings());
//! assert_eq!(config.dump().rankdir(), RankDir::LeftRight);
//! assert!(config.dump().show_ports());
//! ```

use std::fmt;

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Check configuration section.
    #[serde(default)]
    check: CheckConfig,

    /// Dump configuration section.
    #[serde(default)]
    dump: DumpConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(check: CheckConfig, dump: DumpConfig) -> Self {
        Self { check, dump }
    }

    /// Returns the check configuration.
    pub fn check(&self) -> &CheckConfig {
        &self.check
    }

    /// Returns the dump configuration.
    pub fn dump(&self) -> &DumpConfig {
        &self.dump
    }
}

/// Settings for design checking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckConfig {
    /// Treat any collected warning as a failure.
    #[serde(default)]
    deny_warnings: bool,
}

impl CheckConfig {
    pub fn new(deny_warnings: bool) -> Self {
        Self { deny_warnings }
    }

    /// Returns `true` if warnings should fail the run.
    pub fn deny_warnings(&self) -> bool {
        self.deny_warnings
    }
}

/// Graphviz rank direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum RankDir {
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "RL")]
    RightLeft,
    #[serde(rename = "BT")]
    BottomTop,
}

impl RankDir {
    /// The attribute value Graphviz expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            RankDir::LeftRight => "LR",
            RankDir::TopBottom => "TB",
            RankDir::RightLeft => "RL",
            RankDir::BottomTop => "BT",
        }
    }
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for the Graphviz DOT dump.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Layout direction of the digraph.
    rankdir: RankDir,

    /// Emit a terminal node for every primary input and output.
    show_ports: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            rankdir: RankDir::default(),
            show_ports: true,
        }
    }
}

impl DumpConfig {
    pub fn new(rankdir: RankDir, show_ports: bool) -> Self {
        Self {
            rankdir,
            show_ports,
        }
    }

    pub fn rankdir(&self) -> RankDir {
        self.rankdir
    }

    pub fn show_ports(&self) -> bool {
        self.show_ports
    }
}
