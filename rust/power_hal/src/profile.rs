// SPDX-License-Identifier: GPL-2.0
//
// power_hal: power profiles and their CPU frequency bounds

use std::fmt;

use serde::{Deserialize, Serialize};

pub const POWERSAVE_MIN_FREQ: u32 = 384_000;
pub const POWERSAVE_MAX_FREQ: u32 = 1_026_000;
pub const BIAS_PERF_MIN_FREQ: u32 = 1_134_000;
pub const NORMAL_MAX_FREQ: u32 = 1_512_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PowerProfile {
    PowerSave = 0,
    #[default]
    Balanced = 1,
    HighPerformance = 2,
    BiasPower = 3,
    BiasPerformance = 4,
}

impl PowerProfile {
    pub const COUNT: usize = 5;

    pub const ALL: [PowerProfile; Self::COUNT] = [
        PowerProfile::PowerSave,
        PowerProfile::Balanced,
        PowerProfile::HighPerformance,
        PowerProfile::BiasPower,
        PowerProfile::BiasPerformance,
    ];

    /// Map a platform profile id. Ids outside the table yield `None`.
    pub fn from_id(id: i32) -> Option<Self> {
        usize::try_from(id).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn bounds(self) -> FrequencyBounds {
        FrequencyBounds::for_profile_id(self.id())
    }
}

impl fmt::Display for PowerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerProfile::PowerSave => "power_save",
            PowerProfile::Balanced => "balanced",
            PowerProfile::HighPerformance => "high_performance",
            PowerProfile::BiasPower => "bias_power",
            PowerProfile::BiasPerformance => "bias_performance",
        };
        write!(f, "{}", name)
    }
}

/// CPU frequency limits in kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyBounds {
    pub min_freq: u32,
    pub max_freq: u32,
}

impl FrequencyBounds {
    pub const FALLBACK: FrequencyBounds = FrequencyBounds {
        min_freq: POWERSAVE_MIN_FREQ,
        max_freq: NORMAL_MAX_FREQ,
    };

    /// Bounds for a raw profile id. Unknown ids get the fallback bounds.
    pub fn for_profile_id(id: i32) -> Self {
        match PowerProfile::from_id(id) {
            Some(PowerProfile::PowerSave) | Some(PowerProfile::BiasPower) => FrequencyBounds {
                min_freq: POWERSAVE_MIN_FREQ,
                max_freq: POWERSAVE_MAX_FREQ,
            },
            Some(PowerProfile::HighPerformance) => FrequencyBounds {
                min_freq: NORMAL_MAX_FREQ,
                max_freq: NORMAL_MAX_FREQ,
            },
            Some(PowerProfile::BiasPerformance) => FrequencyBounds {
                min_freq: BIAS_PERF_MIN_FREQ,
                max_freq: NORMAL_MAX_FREQ,
            },
            Some(PowerProfile::Balanced) | None => Self::FALLBACK,
        }
    }
}
