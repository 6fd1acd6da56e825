// SPDX-License-Identifier: GPL-2.0
//
// power_hal: datagram channel to the boost daemon
//
// Commands are fire-and-forget "<code>:<pid>" tokens sent to a fixed
// filesystem socket. No reply is read and nothing is retried.

use std::fmt;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use log::error;
use once_cell::sync::OnceCell;

use crate::error::{PowerError, Result};

pub const BOOST_SOCKET: &str = "/dev/socket/pb";

/// Upper bound on one command datagram, in bytes.
pub const MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BoostCommand {
    TouchBoost = 1,
    SyncStart = 2,
    SyncStop = 3,
    EncodeBoostStart = 5,
    EncodeBoostStop = 6,
}

impl BoostCommand {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Sync command selected by the daemon's `off` flag.
    pub fn sync(off: bool) -> Self {
        if off {
            BoostCommand::SyncStop
        } else {
            BoostCommand::SyncStart
        }
    }

    /// Encode-boost command selected by the daemon's `off` flag.
    pub fn enc_boost(off: bool) -> Self {
        if off {
            BoostCommand::EncodeBoostStop
        } else {
            BoostCommand::EncodeBoostStart
        }
    }
}

impl fmt::Display for BoostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoostCommand::TouchBoost => "touch_boost",
            BoostCommand::SyncStart => "sync_start",
            BoostCommand::SyncStop => "sync_stop",
            BoostCommand::EncodeBoostStart => "enc_boost_start",
            BoostCommand::EncodeBoostStop => "enc_boost_stop",
        };
        write!(f, "{}", name)
    }
}

/// Build the wire token for `cmd` on behalf of `pid`.
pub fn format_message(cmd: BoostCommand, pid: u32) -> Result<String> {
    let msg = format!("{}:{}", cmd.code(), pid);
    if msg.len() > MAX_LENGTH {
        return Err(PowerError::MessageTooLong {
            len: msg.len(),
            max: MAX_LENGTH,
        });
    }
    Ok(msg)
}

/// Sink for boost daemon commands.
pub trait BoostOps: Send + Sync {
    /// Create the endpoint if that has not been attempted yet. Returns whether
    /// the channel is usable.
    fn ensure_init(&self) -> bool;

    fn send(&self, cmd: BoostCommand, pid: u32) -> Result<()>;
}

/// Unbound datagram socket aimed at the daemon's address.
///
/// Creation is attempted once. A failed attempt leaves the channel disabled
/// for the life of the process and every later send is skipped.
pub struct BoostChannel {
    peer: PathBuf,
    socket: OnceCell<Option<UnixDatagram>>,
}

impl BoostChannel {
    pub fn new(peer: impl AsRef<Path>) -> Self {
        Self {
            peer: peer.as_ref().to_path_buf(),
            socket: OnceCell::new(),
        }
    }

    pub fn peer(&self) -> &Path {
        &self.peer
    }

    pub fn is_initialized(&self) -> bool {
        self.socket.get().is_some()
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.socket.get(), Some(Some(_)))
    }
}

impl BoostOps for BoostChannel {
    fn ensure_init(&self) -> bool {
        self.socket
            .get_or_init(|| match UnixDatagram::unbound() {
                Ok(sock) => Some(sock),
                Err(source) => {
                    let err = PowerError::Socket {
                        op: "create",
                        source,
                    };
                    error!("Boost: {}", err);
                    None
                }
            })
            .is_some()
    }

    fn send(&self, cmd: BoostCommand, pid: u32) -> Result<()> {
        self.ensure_init();
        let Some(Some(sock)) = self.socket.get() else {
            return Err(PowerError::SocketDisabled);
        };

        let msg = format_message(cmd, pid)?;
        sock.send_to(msg.as_bytes(), &self.peer)
            .map_err(|source| PowerError::Socket { op: "send", source })?;
        Ok(())
    }
}

impl fmt::Debug for BoostChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoostChannel")
            .field("peer", &self.peer)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
