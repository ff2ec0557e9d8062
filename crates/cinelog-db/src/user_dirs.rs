//! Per-user base directories following the XDG layout.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, bail};

/// Application directory name under each base directory.
pub const APP_DIR_NAME: &str = "cinelog";

/// Kind of per-user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDir {
    /// `$XDG_CONFIG_HOME/cinelog`, else `~/.config/cinelog`.
    Config,
    /// `$XDG_DATA_HOME/cinelog`, else `~/.local/share/cinelog`.
    Data,
}

impl UserDir {
    const fn env_var(self) -> &'static str {
        match self {
            Self::Config => "XDG_CONFIG_HOME",
            Self::Data => "XDG_DATA_HOME",
        }
    }

    const fn home_relative(self) -> &'static [&'static str] {
        match self {
            Self::Config => &[".config"],
            Self::Data => &[".local", "share"],
        }
    }

    /// Resolves the application directory from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the XDG variable nor `HOME` is set.
    pub fn resolve(self) -> Result<PathBuf> {
        self.resolve_from(std::env::var_os(self.env_var()), std::env::var_os("HOME"))
    }

    /// Resolves the application directory from explicit variable values.
    /// Empty or relative XDG values are ignored, as the XDG spec requires.
    fn resolve_from(self, xdg: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
        if let Some(base) = xdg.map(PathBuf::from).filter(|p| p.is_absolute()) {
            return Ok(base.join(APP_DIR_NAME));
        }

        let Some(home) = home.filter(|h| !h.is_empty()) else {
            bail!("neither {} nor HOME environment variable is set", self.env_var());
        };
        let mut path = PathBuf::from(home);
        path.extend(self.home_relative());
        Ok(path.join(APP_DIR_NAME))
    }
}
