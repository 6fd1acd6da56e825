// SPDX-License-Identifier: GPL-2.0

use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use power_hal::hint::{POWER_HINT_INTERACTION, POWER_HINT_SET_PROFILE, POWER_HINT_VIDEO_ENCODE};
use power_hal::{HintData, PowerConfig, PowerHal, PowerProfile, PLATFORM_PARAM_COUNT};
use tempfile::{tempdir, TempDir};

struct Rig {
    dir: TempDir,
    hal: PowerHal,
    daemon: UnixDatagram,
}

impl Rig {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let config = PowerConfig::rooted_at(dir.path());
        fs::write(&config.max_freq_path, "0").unwrap();
        fs::write(&config.min_freq_path, "0").unwrap();

        let daemon = UnixDatagram::bind(&config.boost_socket_path).unwrap();
        daemon.set_nonblocking(true).unwrap();

        let hal = PowerHal::new(config);
        hal.init();
        Self { dir, hal, daemon }
    }

    /// Every datagram queued so far, pid stripped.
    fn drain(&self) -> Vec<String> {
        let pid = std::process::id();
        let mut buf = [0u8; 64];
        let mut out = Vec::new();
        loop {
            match self.daemon.recv(&mut buf) {
                Ok(len) => {
                    let msg = std::str::from_utf8(&buf[..len]).unwrap();
                    let (code, sender) = msg.split_once(':').unwrap();
                    assert_eq!(sender, pid.to_string());
                    out.push(code.to_string());
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => panic!("recv failed: {e}"),
            }
        }
        out
    }

    fn knob(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}

#[test]
fn interactive_changes_reach_daemon() {
    let rig = Rig::new();

    rig.hal.power_set_interactive(true);
    rig.hal.power_set_interactive(true);
    rig.hal.power_set_interactive(true);
    assert_eq!(rig.drain(), vec!["2", "1"]);

    rig.hal.power_set_interactive(false);
    rig.hal.power_set_interactive(false);
    assert_eq!(rig.drain(), vec!["3"]);
}

#[test]
fn high_performance_pins_frequency() {
    let rig = Rig::new();
    let config = rig.hal.config().clone();

    rig.hal.power_hint(POWER_HINT_SET_PROFILE, HintData::Profile(2));
    assert_eq!(rig.knob(&config.min_freq_path), "1512000");
    assert_eq!(rig.knob(&config.max_freq_path), "1512000");
    assert_eq!(rig.hal.current_profile(), PowerProfile::HighPerformance);

    rig.hal.power_hint(POWER_HINT_SET_PROFILE, HintData::Profile(3));
    assert_eq!(rig.knob(&config.min_freq_path), "384000");
    assert_eq!(rig.knob(&config.max_freq_path), "1026000");
    assert!(rig.drain().is_empty());
}

#[test]
fn power_save_silences_hints() {
    let rig = Rig::new();
    let config = rig.hal.config().clone();
    rig.hal.power_hint(POWER_HINT_SET_PROFILE, HintData::Profile(0));
    fs::write(&config.min_freq_path, "untouched").unwrap();
    fs::write(&config.max_freq_path, "untouched").unwrap();

    rig.hal.power_set_interactive(true);
    rig.hal.power_hint(POWER_HINT_INTERACTION, HintData::None);
    rig.hal.power_hint(POWER_HINT_VIDEO_ENCODE, HintData::Token("state=1"));

    assert!(rig.drain().is_empty());
    assert_eq!(rig.knob(&config.min_freq_path), "untouched");
    assert_eq!(rig.knob(&config.max_freq_path), "untouched");
}

#[test]
fn video_encode_sequence() {
    let rig = Rig::new();
    rig.hal.power_hint(POWER_HINT_VIDEO_ENCODE, HintData::Token("state=1"));
    rig.hal.power_hint(POWER_HINT_VIDEO_ENCODE, HintData::Token("state=2"));
    rig.hal.power_hint(POWER_HINT_VIDEO_ENCODE, HintData::Token("state=0"));
    assert_eq!(rig.drain(), vec!["3", "6", "2", "5"]);
}

#[test]
fn missing_endpoints_are_harmless() {
    let dir = tempdir().unwrap();
    let hal = PowerHal::new(PowerConfig::rooted_at(dir.path()));
    hal.init();

    hal.power_hint(POWER_HINT_SET_PROFILE, HintData::Profile(4));
    assert_eq!(hal.current_profile(), PowerProfile::BiasPerformance);
    assert!(!hal.config().max_freq_path.exists());

    hal.power_set_interactive(true);
    hal.power_hint(POWER_HINT_INTERACTION, HintData::None);

    let mut out = [7u64; PLATFORM_PARAM_COUNT];
    hal.extract_platform_stats(&mut out).unwrap();
    assert_eq!(out, [0; PLATFORM_PARAM_COUNT]);
}

#[test]
fn platform_stats_from_both_files() {
    let rig = Rig::new();
    let config = rig.hal.config();
    fs::write(
        &config.rpm_stats_path,
        "RPM Mode:vlow\n\tvlow_count: 5\n\taccumulated_vlow_time : 42\n\
         RPM Mode:vmin\n\tvmin_count: 1\n\taccumulated_vmin_time: 2\n",
    )
    .unwrap();
    fs::write(
        &config.rpm_master_stats_path,
        "APSS\n\txo_accumulated_duration:0x10\n\txo_count:1a\n\
         MPSS\n\txo_accumulated_duration:0x20\n\txo_count:0x1\n",
    )
    .unwrap();

    let stats = rig.hal.platform_stats();
    assert_eq!(stats, [5, 42, 1, 2, 0x10, 26, 0x20, 1, 0, 0, 0, 0]);
    assert!(rig.dir.path().exists());
}

#[test]
fn concurrent_interactive_sends_once() {
    let rig = Arc::new(Rig::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let rig = Arc::clone(&rig);
            thread::spawn(move || rig.hal.power_set_interactive(true))
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(rig.drain(), vec!["2", "1"]);
}
