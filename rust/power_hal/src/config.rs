// SPDX-License-Identifier: GPL-2.0
//
// power_hal: endpoint configuration

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::boost::BOOST_SOCKET;
use crate::stats::{RPM_MASTER_STAT, RPM_STAT};
use crate::sysfs::{MAX_FREQ_LIMIT_PATH, MIN_FREQ_LIMIT_PATH};

/// Locations of every kernel and daemon endpoint the HAL touches.
/// Missing keys in a config file keep their device defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub max_freq_path: PathBuf,
    pub min_freq_path: PathBuf,
    pub boost_socket_path: PathBuf,
    pub rpm_stats_path: PathBuf,
    pub rpm_master_stats_path: PathBuf,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            max_freq_path: PathBuf::from(MAX_FREQ_LIMIT_PATH),
            min_freq_path: PathBuf::from(MIN_FREQ_LIMIT_PATH),
            boost_socket_path: PathBuf::from(BOOST_SOCKET),
            rpm_stats_path: PathBuf::from(RPM_STAT),
            rpm_master_stats_path: PathBuf::from(RPM_MASTER_STAT),
        }
    }
}

impl PowerConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Every endpoint placed under `root`, using the usual file names.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            max_freq_path: root.join("limited_max_freq"),
            min_freq_path: root.join("limited_min_freq"),
            boost_socket_path: root.join("pb"),
            rpm_stats_path: root.join("rpm_stats"),
            rpm_master_stats_path: root.join("rpm_master_stats"),
        }
    }
}
