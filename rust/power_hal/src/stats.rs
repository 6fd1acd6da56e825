// SPDX-License-Identifier: GPL-2.0
//
// power_hal: RPM statistics reader
//
// Pulls an ordered list of named counters out of the kernel's rpm_stats and
// rpm_master_stats debugfs files. Fields are matched strictly in order, so a
// name may repeat (the master file lists one xo_* pair per subsystem).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{trace, warn};

use crate::error::{PowerError, Result};

pub const RPM_STAT: &str = "/d/rpm_stats";
pub const RPM_MASTER_STAT: &str = "/d/rpm_master_stats";

pub const RPM_PARAM_COUNT: usize = 4;
pub const RPM_MASTER_PARAM_COUNT: usize = 8;
pub const PLATFORM_PARAM_COUNT: usize = RPM_PARAM_COUNT + RPM_MASTER_PARAM_COUNT;

pub const RPM_PARAM_NAMES: [&str; RPM_PARAM_COUNT] = [
    "vlow_count",
    "accumulated_vlow_time",
    "vmin_count",
    "accumulated_vmin_time",
];

pub const RPM_MASTER_PARAM_NAMES: [&str; RPM_MASTER_PARAM_COUNT] = [
    "xo_accumulated_duration",
    "xo_count",
    "xo_accumulated_duration",
    "xo_count",
    "xo_accumulated_duration",
    "xo_count",
    "xo_accumulated_duration",
    "xo_count",
];

pub type StatsVector = [u64; PLATFORM_PARAM_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Hex,
}

/// Parse the value text after a field's colon. Leading blanks are skipped,
/// hex accepts an optional 0x prefix, and anything after the digits is
/// ignored. Text with no digits parses as `None`.
fn parse_value(text: &str, radix: Radix) -> Option<u64> {
    let text = text.trim_start();
    let (digits, base) = match radix {
        Radix::Decimal => (text, 10),
        Radix::Hex => {
            let stripped = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
                .filter(|rest| rest.starts_with(|c: char| c.is_ascii_hexdigit()))
                .unwrap_or(text);
            (stripped, 16)
        }
    };

    let end = digits
        .find(|c: char| !c.is_digit(base))
        .unwrap_or(digits.len());
    u64::from_str_radix(&digits[..end], base).ok()
}

/// Value of `line` if it carries `name`, `None` when the line is for some
/// other field or has no colon.
fn match_field(line: &str, name: &str, radix: Radix) -> Option<u64> {
    let body = line.trim_start_matches([' ', '\t']);
    if !body.starts_with(name) {
        return None;
    }

    let colon = line.find(':')?;
    let value = parse_value(&line[colon + 1..], radix);
    if value.is_none() {
        trace!("Stats: unparsable value for {}: {:?}", name, line.trim_end());
    }
    Some(value.unwrap_or(0))
}

/// Fill `out` with the values of `names`, in order, from `path`.
///
/// Only `min(out.len(), names.len())` slots are touched; they are zeroed
/// first, so fields the file never mentions read as 0. Returns how many
/// fields were found. A missing file is `FileUnavailable`.
pub fn extract_stats(out: &mut [u64], path: &Path, names: &[&str], radix: Radix) -> Result<usize> {
    let count = out.len().min(names.len());
    out[..count].fill(0);

    let file = File::open(path).map_err(|source| PowerError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut index = 0;
    let mut buf = Vec::new();
    while index < count {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Stats: read error on {}: {}", path.display(), e);
                break;
            }
        }

        let line = String::from_utf8_lossy(&buf);
        if let Some(value) = match_field(&line, names[index], radix) {
            out[index] = value;
            index += 1;
        }
    }

    Ok(index)
}

/// Reader for the platform-level low power mode counters.
#[derive(Debug, Clone)]
pub struct StatsParser {
    rpm_stats_path: PathBuf,
    rpm_master_stats_path: PathBuf,
}

impl Default for StatsParser {
    fn default() -> Self {
        Self::new(RPM_STAT, RPM_MASTER_STAT)
    }
}

impl StatsParser {
    pub fn new(rpm_stats_path: impl AsRef<Path>, rpm_master_stats_path: impl AsRef<Path>) -> Self {
        Self {
            rpm_stats_path: rpm_stats_path.as_ref().to_path_buf(),
            rpm_master_stats_path: rpm_master_stats_path.as_ref().to_path_buf(),
        }
    }

    /// Fill all `PLATFORM_PARAM_COUNT` slots. The decimal RPM counters come
    /// first, then the hex master counters. A missing file zeroes its own
    /// segment only; this never fails.
    pub fn extract_platform_stats(&self, out: &mut StatsVector) -> Result<()> {
        let (rpm, master) = out.split_at_mut(RPM_PARAM_COUNT);

        if let Err(e) = extract_stats(rpm, &self.rpm_stats_path, &RPM_PARAM_NAMES, Radix::Decimal) {
            warn!("Stats: {}", e);
            rpm.fill(0);
        }

        if let Err(e) = extract_stats(
            master,
            &self.rpm_master_stats_path,
            &RPM_MASTER_PARAM_NAMES,
            Radix::Hex,
        ) {
            warn!("Stats: {}", e);
            master.fill(0);
        }

        Ok(())
    }

    pub fn platform_stats(&self) -> StatsVector {
        let mut out = [0; PLATFORM_PARAM_COUNT];
        let _ = self.extract_platform_stats(&mut out);
        out
    }
}
