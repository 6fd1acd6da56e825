// SPDX-License-Identifier: GPL-2.0
//
// powerhint: drive the power HAL from the command line
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};

use power_hal::hint::{POWER_HINT_INTERACTION, POWER_HINT_LAUNCH, POWER_HINT_SET_PROFILE, POWER_HINT_VIDEO_ENCODE};
use power_hal::stats::{RPM_MASTER_PARAM_NAMES, RPM_PARAM_NAMES};
use power_hal::{get_number_of_profiles, HintData, PowerConfig, PowerHal, PowerProfile};

#[derive(Debug, Parser)]
#[command(
    name = "powerhint",
    version,
    about = "Send power hints to the boost daemon and read RPM low power statistics."
)]
struct Opts {
    /// JSON file with endpoint paths. Unset keys keep the device defaults.
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// Override the cpufreq max limit knob.
    #[clap(long)]
    max_freq_path: Option<PathBuf>,

    /// Override the cpufreq min limit knob.
    #[clap(long)]
    min_freq_path: Option<PathBuf>,

    /// Override the boost daemon socket.
    #[clap(long, env = "POWERHINT_BOOST_SOCKET")]
    boost_socket: Option<PathBuf>,

    /// Override the rpm_stats file.
    #[clap(long)]
    rpm_stats: Option<PathBuf>,

    /// Override the rpm_master_stats file.
    #[clap(long)]
    rpm_master_stats: Option<PathBuf>,

    /// Enable verbose output. Specify multiple times to increase verbosity.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnOff {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a raw hint code (decimal or 0x-prefixed hex).
    Hint {
        code: String,
        /// Profile id payload.
        #[clap(long, conflicts_with = "token")]
        profile: Option<i32>,
        /// String payload.
        #[clap(long)]
        token: Option<String>,
    },
    /// User interaction boost.
    Interaction,
    /// Application launch boost.
    Launch,
    /// Video encoder state token (state=0..3).
    VideoEncode { token: String },
    /// Switch power profile.
    Profile { id: i32 },
    /// Report the display interactive state.
    Interactive {
        #[clap(value_enum)]
        state: OnOff,
    },
    /// Print the platform low power counters.
    Stats {
        /// Emit JSON instead of a table.
        #[clap(long)]
        json: bool,
    },
    /// List the supported power profiles.
    Profiles,
    /// Run a script of commands against one HAL instance, one per line.
    Replay { script: PathBuf },
}

fn init_log(verbose: u8) -> Result<()> {
    let llv = match verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };

    let mut config_builder = simplelog::ConfigBuilder::new();
    let _ = config_builder.set_time_offset_to_local();

    simplelog::TermLogger::init(
        llv,
        config_builder
            .set_time_level(simplelog::LevelFilter::Error)
            .set_location_level(simplelog::LevelFilter::Off)
            .set_target_level(simplelog::LevelFilter::Off)
            .set_thread_level(simplelog::LevelFilter::Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn build_config(opts: &Opts) -> Result<PowerConfig> {
    let mut config = match &opts.config {
        Some(path) => PowerConfig::load(path)?,
        None => PowerConfig::default(),
    };

    if let Some(path) = &opts.max_freq_path {
        config.max_freq_path = path.clone();
    }
    if let Some(path) = &opts.min_freq_path {
        config.min_freq_path = path.clone();
    }
    if let Some(path) = &opts.boost_socket {
        config.boost_socket_path = path.clone();
    }
    if let Some(path) = &opts.rpm_stats {
        config.rpm_stats_path = path.clone();
    }
    if let Some(path) = &opts.rpm_master_stats {
        config.rpm_master_stats_path = path.clone();
    }
    Ok(config)
}

fn parse_code(code: &str) -> Result<u32> {
    let parsed = match code.strip_prefix("0x").or_else(|| code.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => code.parse::<u32>(),
    };
    parsed.with_context(|| format!("Invalid hint code: {}", code))
}

fn print_stats(hal: &PowerHal, json: bool) -> Result<()> {
    let stats = hal.platform_stats();
    let names = RPM_PARAM_NAMES.iter().chain(RPM_MASTER_PARAM_NAMES.iter());

    if json {
        let entries: Vec<_> = names
            .zip(stats.iter())
            .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (slot, (name, value)) in names.zip(stats.iter()).enumerate() {
            println!("{:>2} {:<24} {}", slot, name, value);
        }
    }
    Ok(())
}

fn print_profiles(hal: &PowerHal) {
    println!("{} profiles", get_number_of_profiles());
    for profile in PowerProfile::ALL {
        let bounds = profile.bounds();
        let marker = if profile == hal.current_profile() { "*" } else { " " };
        println!(
            "{} {} {:<18} min={:<8} max={}",
            marker,
            profile.id(),
            profile.to_string(),
            bounds.min_freq,
            bounds.max_freq
        );
    }
}

fn run_command(hal: &PowerHal, command: &Command) -> Result<()> {
    match command {
        Command::Hint {
            code,
            profile,
            token,
        } => {
            let code = parse_code(code)?;
            let data = match (profile, token) {
                (Some(id), _) => HintData::Profile(*id),
                (None, Some(token)) => HintData::Token(token),
                (None, None) => HintData::None,
            };
            hal.power_hint(code, data);
        }
        Command::Interaction => hal.power_hint(POWER_HINT_INTERACTION, HintData::None),
        Command::Launch => hal.power_hint(POWER_HINT_LAUNCH, HintData::None),
        Command::VideoEncode { token } => {
            hal.power_hint(POWER_HINT_VIDEO_ENCODE, HintData::Token(token))
        }
        Command::Profile { id } => hal.power_hint(POWER_HINT_SET_PROFILE, HintData::Profile(*id)),
        Command::Interactive { state } => {
            hal.power_set_interactive(matches!(state, OnOff::On))
        }
        Command::Stats { json } => print_stats(hal, *json)?,
        Command::Profiles => print_profiles(hal),
        Command::Replay { script } => replay(hal, script)?,
    }
    Ok(())
}

/// Each script line is a powerhint subcommand with its arguments, e.g.
/// `interactive on` or `video-encode state=1`. Blank lines and `#` comments
/// are skipped.
fn replay(hal: &PowerHal, script: &Path) -> Result<()> {
    #[derive(Debug, Parser)]
    #[command(no_binary_name = true)]
    struct Line {
        #[command(subcommand)]
        command: Command,
    }

    let content = fs::read_to_string(script)
        .with_context(|| format!("Failed to read {}", script.display()))?;

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = Line::try_parse_from(line.split_whitespace())
            .with_context(|| format!("{}:{}: {}", script.display(), lineno + 1, line))?;
        if matches!(parsed.command, Command::Replay { .. }) {
            bail!("{}:{}: nested replay", script.display(), lineno + 1);
        }

        debug!("Replay: {}", line);
        run_command(hal, &parsed.command)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    init_log(opts.verbose)?;

    let config = build_config(&opts)?;
    debug!("Config: {:?}", config);

    let hal = PowerHal::new(config);
    hal.init();

    run_command(&hal, &opts.command)?;

    info!(
        "Profile: {} interactive: {:?}",
        hal.current_profile(),
        hal.interactive_state()
    );
    Ok(())
}
