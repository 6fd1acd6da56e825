// SPDX-License-Identifier: GPL-2.0
//
// power_hal: sysfs control file writer

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::{PowerError, Result};

pub const MAX_FREQ_LIMIT_PATH: &str = "/sys/kernel/cpufreq_limit/limited_max_freq";
pub const MIN_FREQ_LIMIT_PATH: &str = "/sys/kernel/cpufreq_limit/limited_min_freq";

/// Sink for kernel control knobs.
pub trait SysfsOps: Send + Sync {
    fn write_str(&self, path: &Path, value: &str) -> Result<()>;

    /// Integers go out as plain decimal text, no trailing newline.
    fn write_int(&self, path: &Path, value: i64) -> Result<()> {
        self.write_str(path, &value.to_string())
    }
}

/// Writes straight to the file system. The node must already exist; absent
/// nodes (kernels without the knob) fail at open.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsWriter;

impl SysfsOps for SysfsWriter {
    fn write_str(&self, path: &Path, value: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|source| PowerError::Io {
                op: "open",
                path: path.to_path_buf(),
                source,
            })?;

        file.write_all(value.as_bytes())
            .map_err(|source| PowerError::Io {
                op: "write",
                path: path.to_path_buf(),
                source,
            })
    }
}
