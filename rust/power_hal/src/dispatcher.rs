// SPDX-License-Identifier: GPL-2.0
//
// power_hal: hint dispatcher
//
// Turns platform hints into boost daemon commands and cpufreq limit writes.
// State is the last interactive state seen plus the active power profile.
// While the profile is POWER_SAVE every hint except SET_PROFILE is dropped.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

use log::{debug, error, info, trace, warn};

use crate::boost::{BoostChannel, BoostCommand, BoostOps};
use crate::config::PowerConfig;
use crate::hint::{EncodeState, HintData, PowerHint};
use crate::profile::{FrequencyBounds, PowerProfile};
use crate::sysfs::{SysfsOps, SysfsWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InteractiveState {
    /// Nothing observed yet.
    Unknown = 0,
    On = 1,
    Off = 2,
}

impl InteractiveState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => InteractiveState::On,
            2 => InteractiveState::Off,
            _ => InteractiveState::Unknown,
        }
    }
}

impl From<bool> for InteractiveState {
    fn from(on: bool) -> Self {
        if on {
            InteractiveState::On
        } else {
            InteractiveState::Off
        }
    }
}

pub struct HintDispatcher<S = SysfsWriter, B = BoostChannel> {
    sysfs: S,
    boost: B,
    max_freq_path: PathBuf,
    min_freq_path: PathBuf,
    pid: u32,
    interactive: AtomicU8,
    profile: AtomicU8,
    // Held across the bounds writes so two profile changes never interleave.
    profile_lock: Mutex<()>,
}

impl HintDispatcher {
    pub fn new(config: &PowerConfig) -> Self {
        Self::with_sinks(config, SysfsWriter, BoostChannel::new(&config.boost_socket_path))
    }
}

impl<S: SysfsOps, B: BoostOps> HintDispatcher<S, B> {
    pub fn with_sinks(config: &PowerConfig, sysfs: S, boost: B) -> Self {
        Self {
            sysfs,
            boost,
            max_freq_path: config.max_freq_path.clone(),
            min_freq_path: config.min_freq_path.clone(),
            pid: std::process::id(),
            interactive: AtomicU8::new(InteractiveState::Unknown as u8),
            profile: AtomicU8::new(PowerProfile::default() as u8),
            profile_lock: Mutex::new(()),
        }
    }

    pub fn boost(&self) -> &B {
        &self.boost
    }

    pub fn sysfs(&self) -> &S {
        &self.sysfs
    }

    pub fn current_profile(&self) -> PowerProfile {
        let raw = self.profile.load(Ordering::Acquire);
        PowerProfile::from_id(raw as i32).unwrap_or_default()
    }

    pub fn interactive_state(&self) -> InteractiveState {
        InteractiveState::from_u8(self.interactive.load(Ordering::Acquire))
    }

    fn is_gated(&self) -> bool {
        self.current_profile() == PowerProfile::PowerSave
    }

    /// Handle one hint. Unknown codes are ignored.
    pub fn power_hint(&self, code: u32, data: HintData<'_>) {
        let hint = PowerHint::from(code);

        if hint == PowerHint::SetProfile {
            match data.profile() {
                Some(id) => self.set_profile(id),
                None => warn!("Hint: SET_PROFILE without a profile id, ignored"),
            }
            return;
        }

        if self.is_gated() {
            trace!("Hint: {:?} dropped in power save", hint);
            return;
        }

        match hint {
            PowerHint::Interaction | PowerHint::Launch => {
                trace!("Hint: {:?}", hint);
                self.touch_boost();
            }
            PowerHint::VideoEncode => self.process_video_encode(data.token()),
            PowerHint::SetProfile | PowerHint::Other(_) => {}
        }
    }

    /// Screen on/off. Only an actual change of state reaches the daemon.
    pub fn set_interactive(&self, on: bool) {
        if self.is_gated() {
            trace!("Interactive: {} dropped in power save", on);
            return;
        }

        let next = InteractiveState::from(on);
        let prev = self.interactive.swap(next as u8, Ordering::AcqRel);
        if prev == next as u8 {
            return;
        }

        debug!("Interactive: {}", if on { "ON" } else { "OFF" });
        if on {
            self.sync_thread(false);
            self.touch_boost();
        } else {
            // No touch boost when going non-interactive.
            self.sync_thread(true);
        }
    }

    /// Apply the frequency bounds for `id` and make it the active profile.
    /// Ids outside the table write the fallback bounds and leave the
    /// dispatcher in BALANCED.
    pub fn set_profile(&self, id: i32) {
        let _guard = self
            .profile_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let bounds = FrequencyBounds::for_profile_id(id);
        let profile = PowerProfile::from_id(id).unwrap_or_else(|| {
            warn!("Profile: unknown profile id {}, using fallback bounds", id);
            PowerProfile::default()
        });
        debug!("Profile: id={} min={} max={}", id, bounds.min_freq, bounds.max_freq);

        if let Err(e) = self.sysfs.write_int(&self.min_freq_path, bounds.min_freq.into()) {
            error!("Profile: {}", e);
        }
        if let Err(e) = self.sysfs.write_int(&self.max_freq_path, bounds.max_freq.into()) {
            error!("Profile: {}", e);
        }

        self.profile.store(profile as u8, Ordering::Release);
        info!("Profile: set power profile mode: {}", profile);
    }

    fn process_video_encode(&self, token: Option<&str>) {
        if !self.boost.ensure_init() {
            error!("Video encode: boost socket not created");
            return;
        }

        match token.and_then(EncodeState::from_token) {
            Some(EncodeState::On) => {
                self.sync_thread(true);
                self.enc_boost(true);
            }
            Some(EncodeState::Off) => {
                self.sync_thread(false);
                self.enc_boost(false);
            }
            // HDR start/stop are known states with nothing to do yet.
            Some(EncodeState::HdrOn) | Some(EncodeState::HdrOff) => {}
            None => trace!("Video encode: unrecognized metadata {:?}", token),
        }
    }

    fn touch_boost(&self) {
        self.send(BoostCommand::TouchBoost);
    }

    fn sync_thread(&self, off: bool) {
        self.send(BoostCommand::sync(off));
    }

    fn enc_boost(&self, off: bool) {
        self.send(BoostCommand::enc_boost(off));
    }

    fn send(&self, cmd: BoostCommand) {
        if let Err(e) = self.boost.send(cmd, self.pid) {
            error!("{}: {}", cmd, e);
        }
    }
}
