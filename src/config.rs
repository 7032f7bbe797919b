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

//! Environment configuration
//!
//! Two parallel credential sets are read from the environment: the normal
//! one (`DB_*`) and the challenge one (`CTF_DB_*`). Every key has a default
//! so an unset environment still yields a usable configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::error::Error;
use crate::mode::Mode;

pub const MODE_KEY: &str = "CTF_MODE";
pub const BACKEND_KEY: &str = "SQL_BACKEND";

/// Environment keys and defaults for one credential set.
struct CredentialKeys {
    host: (&'static str, &'static str),
    user: (&'static str, &'static str),
    password: (&'static str, &'static str),
    database: (&'static str, &'static str),
    session_name: (&'static str, &'static str),
}

const NORMAL_KEYS: CredentialKeys = CredentialKeys {
    host: ("DB_HOST", "127.0.0.1"),
    user: ("DB_USER", "prod_user"),
    password: ("DB_PASS", ""),
    database: ("DB_NAME", "prod_db"),
    session_name: ("SQL_SESSION_NAME", "default_session"),
};

const CHALLENGE_KEYS: CredentialKeys = CredentialKeys {
    host: ("CTF_DB_HOST", "127.0.0.1"),
    user: ("CTF_DB_USER", "ctf_user"),
    password: ("CTF_DB_PASS", ""),
    database: ("CTF_DB_NAME", "ctf_db"),
    session_name: ("CTF_SQL_SESSION_NAME", "ctf_session"),
};

/// Key-value lookup the settings are read from.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;

    fn var_or(&self, key: &str, default: &str) -> String {
        self.var(key).unwrap_or_else(|| default.to_string())
    }
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl Environment for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Credentials {
    pub fn new(host: &str, user: &str, password: &str, database: &str) -> Self {
        Credentials {
            host: host.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            database: database.to_string(),
        }
    }

    fn from_env(env: &dyn Environment, keys: &CredentialKeys) -> Self {
        Credentials {
            host: env.var_or(keys.host.0, keys.host.1),
            user: env.var_or(keys.user.0, keys.user.1),
            password: env.var_or(keys.password.0, keys.password.1),
            database: env.var_or(keys.database.0, keys.database.1),
        }
    }

    pub fn normal(env: &dyn Environment) -> Self {
        Credentials::from_env(env, &NORMAL_KEYS)
    }

    pub fn challenge(env: &dyn Environment) -> Self {
        Credentials::from_env(env, &CHALLENGE_KEYS)
    }
}

// Keep passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Which real database sits under either driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Mysql,
}

impl BackendKind {
    pub fn compiled_default() -> Self {
        if cfg!(feature = "mysql") {
            BackendKind::Mysql
        } else {
            BackendKind::Sqlite
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(BackendKind::Sqlite),
            "mysql" => Ok(BackendKind::Mysql),
            other => Err(Error::Config(format!("unknown backend '{}'", other))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendKind::Sqlite => f.write_str("sqlite"),
            BackendKind::Mysql => f.write_str("mysql"),
        }
    }
}

/// Everything resolved at startup: the mode and what it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mode: Mode,
    pub credentials: Credentials,
    pub session_name: String,
    pub backend: BackendKind,
}

impl Settings {
    /// Resolve settings from an optional override and an environment.
    ///
    /// An override, when present, decides the mode on its own and
    /// `CTF_MODE` is not read at all.
    pub fn resolve(mode_override: Option<&str>, env: &dyn Environment) -> Settings {
        let mode = match mode_override {
            Some(value) => Mode::from_flag(value),
            None => env.var(MODE_KEY).map_or(Mode::Normal, |v| Mode::from_flag(&v)),
        };

        let keys = match mode {
            Mode::Challenge => &CHALLENGE_KEYS,
            Mode::Normal => &NORMAL_KEYS,
        };

        let backend = match env.var(BACKEND_KEY) {
            Some(value) => value.parse().unwrap_or_else(|e| {
                warn!("{}, falling back to {}", e, BackendKind::compiled_default());
                BackendKind::compiled_default()
            }),
            None => BackendKind::compiled_default(),
        };

        Settings {
            mode,
            credentials: Credentials::from_env(env, keys),
            session_name: env.var_or(keys.session_name.0, keys.session_name.1),
            backend,
        }
    }
}
