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

//! Driver selection
//!
//! A [`Driver`] fixes which implementation an application talks to. It is
//! built from resolved [`Settings`] and a backend, and hands out
//! `Box<dyn Connection>` so calling code is identical in both modes.

use std::fmt;
use std::sync::Arc;

use log::debug;
use once_cell::sync::OnceCell;

use crate::backend::{backend_for, Backend};
use crate::config::{Credentials, Settings};
use crate::cursor::Connection;
use crate::error::Result;
use crate::mode::{settings, Mode};
use crate::sanitize::Sanitizer;
use crate::{fake, real};

pub struct Driver {
    mode: Mode,
    backend: Arc<dyn Backend>,
    credentials: Credentials,
    session_name: String,
}

static GLOBAL: OnceCell<Driver> = OnceCell::new();

impl Driver {
    pub fn new(settings: &Settings, backend: Arc<dyn Backend>) -> Self {
        Driver {
            mode: settings.mode,
            backend,
            credentials: settings.credentials.clone(),
            session_name: settings.session_name.clone(),
        }
    }

    /// Use the backend named in the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Driver::new(settings, backend_for(settings.backend)?))
    }

    /// The driver for this process, built from [`settings`] on first use.
    pub fn global() -> Result<&'static Driver> {
        GLOBAL.get_or_try_init(|| Driver::from_settings(settings()))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Connect with the credentials the mode selected.
    pub fn connect(&self, sanitizer: Option<Sanitizer>) -> Result<Box<dyn Connection>> {
        self.connect_with(&self.credentials, sanitizer)
    }

    /// Connect with explicit credentials. The sanitizer only applies in
    /// challenge mode; the normal driver binds parameters and has no use
    /// for one.
    pub fn connect_with(
        &self,
        credentials: &Credentials,
        sanitizer: Option<Sanitizer>,
    ) -> Result<Box<dyn Connection>> {
        match self.mode {
            Mode::Challenge => Ok(Box::new(fake::connect(
                self.backend.as_ref(),
                credentials,
                sanitizer,
            )?)),
            Mode::Normal => {
                if sanitizer.is_some() {
                    debug!("normal mode: ignoring sanitizer");
                }
                Ok(Box::new(real::connect(self.backend.as_ref(), credentials)?))
            }
        }
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Driver")
            .field("mode", &self.mode)
            .field("backend", &self.backend.name())
            .field("credentials", &self.credentials)
            .field("session_name", &self.session_name)
            .finish()
    }
}
