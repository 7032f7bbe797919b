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

//! Switchable SQL driver for SQL-injection CTF challenges
//!
//! Application code talks to a [`Connection`] / [`Cursor`] pair and never
//! needs to know which driver is underneath. At startup the process
//! resolves its mode once, from [`install_mode_override`] or the `CTF_MODE`
//! environment variable (`1` or `ctf`):
//!
//! * **normal mode** uses the real driver, which binds every parameter, and
//!   the `DB_*` credentials;
//! * **challenge mode** uses the fake driver, which pastes parameters into
//!   the SQL text unescaped, and the `CTF_DB_*` credentials.
//!
//! ```rust,no_run
//! use ctf_sql::{Driver, Value};
//! # fn main() -> ctf_sql::Result<()> {
//!
//! let driver = Driver::global()?;
//! println!("session: {}", driver.session_name());
//!
//! let conn = driver.connect(None)?;
//! let mut cur = conn.cursor();
//! let user_input = "1 OR 1=1";
//! cur.execute(
//!     "SELECT name FROM products WHERE id = %s",
//!     Some(&[Value::from(user_input)]),
//! )?;
//! // In challenge mode this lists every product.
//! for row in cur.fetchall() {
//!     println!("{:?}", row);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! **The challenge driver is vulnerable on purpose. Never enable it in
//! production.**

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod backend;
mod config;
mod cursor;
mod driver;
mod error;
mod fake;
mod mode;
mod real;
pub mod sanitize;
mod template;
mod tokenizer;
mod value;

pub use config::{BackendKind, Credentials, Environment, ProcessEnvironment, Settings};
pub use cursor::{Connection, Cursor};
pub use driver::Driver;
pub use error::{BackendError, Error, Result};
pub use mode::{install_mode_override, resolve_mode, settings, settings_from, Mode};
pub use real::{RealConnection, RealCursor};
pub use sanitize::{Rejection, Sanitizer};
pub use value::{ResultSet, Row, Value};

/// The challenge-mode surface: exactly the injectable driver's entry point,
/// its connection and cursor, and the shared error type.
pub mod challenge {
    pub use crate::error::Error;
    pub use crate::fake::{connect, FakeConnection, FakeCursor};
}
