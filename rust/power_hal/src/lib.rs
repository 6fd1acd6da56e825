// SPDX-License-Identifier: GPL-2.0
//
// power_hal: power hint HAL for boost-daemon based devices
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

//! Power hint HAL.
//!
//! [`PowerHal`] is the context the host process creates at module init and
//! shares between its hint threads. Hints become datagrams to the boost
//! daemon (`/dev/socket/pb`) and writes to the cpufreq limit knobs; the
//! statistics path reads the RPM debugfs counters. No entry point returns an
//! error to the platform: failures are logged and the knob, message or
//! counter is skipped.

pub mod boost;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hint;
pub mod profile;
pub mod stats;
pub mod sysfs;

pub use boost::{BoostChannel, BoostCommand, BoostOps};
pub use config::PowerConfig;
pub use dispatcher::{HintDispatcher, InteractiveState};
pub use error::PowerError;
pub use hint::{HintData, PowerHint};
pub use profile::{FrequencyBounds, PowerProfile};
pub use stats::{StatsParser, StatsVector, PLATFORM_PARAM_COUNT, RPM_PARAM_COUNT};
pub use sysfs::{SysfsOps, SysfsWriter};

use log::info;

/// Number of power profiles the HAL advertises.
pub fn get_number_of_profiles() -> usize {
    PowerProfile::COUNT
}

pub struct PowerHal {
    config: PowerConfig,
    dispatcher: HintDispatcher,
    stats: StatsParser,
}

impl PowerHal {
    pub fn new(config: PowerConfig) -> Self {
        let dispatcher = HintDispatcher::new(&config);
        let stats = StatsParser::new(&config.rpm_stats_path, &config.rpm_master_stats_path);
        Self {
            config,
            dispatcher,
            stats,
        }
    }

    /// Module init hook. Opens the boost socket up front so the first hint
    /// does not pay for it.
    pub fn init(&self) {
        info!(
            "Power HAL init: boost socket {}",
            self.config.boost_socket_path.display()
        );
        self.dispatcher.boost().ensure_init();
    }

    pub fn config(&self) -> &PowerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &HintDispatcher {
        &self.dispatcher
    }

    pub fn power_hint(&self, code: u32, data: HintData<'_>) {
        self.dispatcher.power_hint(code, data);
    }

    pub fn power_set_interactive(&self, on: bool) {
        self.dispatcher.set_interactive(on);
    }

    pub fn current_profile(&self) -> PowerProfile {
        self.dispatcher.current_profile()
    }

    pub fn interactive_state(&self) -> InteractiveState {
        self.dispatcher.interactive_state()
    }

    pub fn get_number_of_profiles(&self) -> usize {
        get_number_of_profiles()
    }

    /// Fill `out` with the platform low power counters. Always `Ok`; absent
    /// stats files read as zeros.
    pub fn extract_platform_stats(&self, out: &mut StatsVector) -> Result<(), PowerError> {
        self.stats.extract_platform_stats(out)
    }

    pub fn platform_stats(&self) -> StatsVector {
        self.stats.platform_stats()
    }
}

impl Default for PowerHal {
    fn default() -> Self {
        Self::new(PowerConfig::default())
    }
}
