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

//! Database backends
//!
//! A backend is the real database underneath both drivers. It only has to
//! open sessions and run one SQL string with positional `?` parameters.

use std::sync::Arc;

use crate::config::{BackendKind, Credentials};
use crate::error::{BackendError, Error, Result};
use crate::value::{ResultSet, Value};

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Positional parameter marker understood by every backend.
pub const MARKER: &str = "?";

pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn open(&self, credentials: &Credentials) -> Result<Box<dyn Session>, BackendError>;
}

/// One open database session.
pub trait Session: Send {
    /// Run a single statement. `params` bind to `?` markers in order.
    fn run(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, BackendError>;

    fn commit(&mut self) -> Result<(), BackendError>;

    fn rollback(&mut self) -> Result<(), BackendError>;
}

/// Instantiate the backend selected by `kind`, if it was compiled in.
pub fn backend_for(kind: BackendKind) -> Result<Arc<dyn Backend>> {
    match kind {
        #[cfg(feature = "sqlite")]
        BackendKind::Sqlite => Ok(Arc::new(sqlite::SqliteBackend)),
        #[cfg(feature = "mysql")]
        BackendKind::Mysql => Ok(Arc::new(mysql::MysqlBackend)),
        #[allow(unreachable_patterns)]
        other => Err(Error::Config(format!(
            "backend '{}' is not compiled in; enable the \"{}\" feature",
            other, other
        ))),
    }
}
