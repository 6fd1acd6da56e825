// SPDX-License-Identifier: GPL-2.0
//
// power_hal: error taxonomy
//
// Every variant here is absorbed at an entry point (logged, then turned into
// a no-op or a zero-fill). Nothing is surfaced to the platform caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PowerError {
    /// A control file could not be opened or written.
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The boost socket could not be created or a datagram could not be sent.
    #[error("boost socket {op} failed: {source}")]
    Socket {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Socket creation failed earlier; the channel stays disabled.
    #[error("boost socket not created")]
    SocketDisabled,

    /// A statistics pseudo-file is absent on this kernel.
    #[error("stats file {} unavailable: {source}", path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("boost message is {len} bytes, limit is {max}")]
    MessageTooLong { len: usize, max: usize },
}

impl PowerError {
    /// OS error number behind this failure, when there is one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            PowerError::Io { source, .. }
            | PowerError::Socket { source, .. }
            | PowerError::FileUnavailable { source, .. } => source.raw_os_error(),
            PowerError::SocketDisabled | PowerError::MessageTooLong { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PowerError>;
