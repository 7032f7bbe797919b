// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide mode resolution
//!
//! The mode is decided once, by whichever comes first of [`settings`] or
//! [`install_mode_override`], and never changes afterwards. Switching mode
//! means restarting the process.
//!
//! Priority:
//! 1. an override installed with [`install_mode_override`]
//! 2. the `CTF_MODE` environment variable
//! 3. normal mode

use std::fmt;

use log::{debug, warn};
use once_cell::sync::OnceCell;

use crate::config::{Environment, ProcessEnvironment, Settings};
use crate::error::{Error, Result};

/// Flag values that turn challenge mode on. Compared case-insensitively.
pub const TRUTHY_TOKENS: &[&str] = &["1", "ctf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The injectable driver with the challenge credentials
    Challenge,
    /// The real driver with the normal credentials
    Normal,
}

impl Mode {
    /// Interpret a mode flag. Never fails: anything not truthy is normal.
    ///
    /// Surrounding whitespace is ignored, so `" ctf "` from a padded env
    /// file or container manifest still selects challenge mode.
    pub fn from_flag(value: &str) -> Mode {
        let value = value.trim().to_lowercase();
        if TRUTHY_TOKENS.contains(&value.as_str()) {
            Mode::Challenge
        } else {
            Mode::Normal
        }
    }

    pub fn is_challenge(self) -> bool {
        self == Mode::Challenge
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Challenge => f.write_str("ctf"),
            Mode::Normal => f.write_str("normal"),
        }
    }
}

static SETTINGS: OnceCell<Settings> = OnceCell::new();

fn announce(settings: Settings) -> Settings {
    if settings.mode.is_challenge() {
        warn!(
            "challenge mode active (session {}): queries are built without escaping",
            settings.session_name
        );
    } else {
        debug!("normal mode active (session {})", settings.session_name);
    }
    settings
}

/// Pin the mode for this process regardless of `CTF_MODE`.
///
/// The settings are resolved right here, with `value` as the mode flag and
/// the rest read from the process environment. Fails if anything resolved
/// them first, including an earlier override.
pub fn install_mode_override(value: impl Into<String>) -> Result<()> {
    let value = value.into();
    let mut installed = false;
    SETTINGS.get_or_init(|| {
        installed = true;
        debug!("installing mode override {:?}", value);
        announce(Settings::resolve(Some(&value), &ProcessEnvironment))
    });
    if installed {
        Ok(())
    } else {
        Err(Error::Config(
            "mode already resolved; restart the process to change it".to_string(),
        ))
    }
}

/// The process-wide settings, resolved from the real environment on first
/// access.
pub fn settings() -> &'static Settings {
    settings_from(&ProcessEnvironment)
}

/// Like [`settings`], but the first caller decides which environment the
/// settings are read from. Later callers get the cached value.
pub fn settings_from(env: &dyn Environment) -> &'static Settings {
    SETTINGS.get_or_init(|| announce(Settings::resolve(None, env)))
}

pub fn resolve_mode() -> Mode {
    settings().mode
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_tokens_select_challenge() {
        for token in &["1", "ctf", "CTF", " Ctf "] {
            assert_eq!(Mode::from_flag(token), Mode::Challenge, "{:?}", token);
        }
    }

    #[test]
    fn padded_flag_still_counts() {
        assert_eq!(Mode::from_flag(" ctf "), Mode::Challenge);
        assert_eq!(Mode::from_flag("\t1\n"), Mode::Challenge);
        assert_eq!(Mode::from_flag("c tf"), Mode::Normal);
    }

    #[test]
    fn anything_else_is_normal() {
        for token in &["", "0", "true", "yes", "ctf1", "production"] {
            assert_eq!(Mode::from_flag(token), Mode::Normal, "{:?}", token);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Challenge.to_string(), "ctf");
        assert_eq!(Mode::Normal.to_string(), "normal");
    }
}
