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

//! Driver error type
//!
//! Both drivers report failures through the same [`Error`] so application
//! code never has to know which one is active. Errors coming from the
//! underlying database keep the original backend error as their `source`.

use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Error produced by a database backend (rusqlite, mysql, ...).
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A typedef of the result returned by most functions in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// The statement was rejected, either by the database or by the
    /// connection's sanitizer.
    #[error("SQL error: {message}")]
    Sql {
        message: String,
        #[source]
        cause: Option<BackendError>,
    },

    /// The backend session could not be opened.
    #[error("operational error: {message}")]
    Operational {
        message: String,
        #[source]
        cause: Option<BackendError>,
    },

    /// The caller misused the API, e.g. wrong number of parameters.
    #[error("programming error: {0}")]
    Programming(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn sql(cause: BackendError) -> Self {
        Error::Sql {
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    pub(crate) fn operational(cause: BackendError) -> Self {
        Error::Operational {
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    /// True for errors the database (or a sanitizer) reported against a
    /// statement, as opposed to connection or usage problems.
    pub fn is_sql(&self) -> bool {
        matches!(self, Error::Sql { .. })
    }
}

impl From<TokenizerError> for Error {
    fn from(e: TokenizerError) -> Self {
        Error::Programming(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn backend_cause_is_kept_as_source() {
        let cause: BackendError = "no such table: users".into();
        let err = Error::sql(cause);

        assert_eq!(err.to_string(), "SQL error: no such table: users");
        assert!(err.is_sql());
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("no such table: users".to_string())
        );
    }

    #[test]
    fn rejection_has_no_source() {
        let err = Error::Sql {
            message: "blocked".to_string(),
            cause: None,
        };
        assert!(err.source().is_none());
    }
}
