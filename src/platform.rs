//! Host platform detection.

use std::fmt;

use anyhow::{Result, bail};

/// The host operating systems the scripts know how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    /// Maps a `std::env::consts::OS` style name onto a platform.
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::MacOs),
            _ => None,
        }
    }

    /// The platform this process is running on, or an error for hosts
    /// outside Windows, Linux and macOS.
    pub fn detect() -> Result<Self> {
        match Self::from_os(std::env::consts::OS) {
            Some(platform) => Ok(platform),
            None => bail!("Unsupported host platform: {}", std::env::consts::OS),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::MacOs => "macOS",
        })
    }
}
