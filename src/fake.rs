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

//! Challenge-mode driver
//!
//! Deliberately vulnerable. Parameters are pasted into the query text with
//! no quoting, escaping or binding, so any value that changes the grammar
//! of the statement changes what the database runs. The only thing standing
//! between the player and the database is the optional [`Sanitizer`].
//!
//! Never run this against data you care about.

use std::cell::RefCell;

use log::debug;

use crate::backend::{Backend, Session};
use crate::config::Credentials;
use crate::cursor::{Connection, Cursor, CursorState};
use crate::error::{Error, Result};
use crate::sanitize::Sanitizer;
use crate::template::Template;
use crate::value::{Row, Value};

pub struct FakeConnection {
    session: RefCell<Box<dyn Session>>,
    sanitizer: Option<Sanitizer>,
}

/// Open an injectable connection.
///
/// The session itself comes from `backend`; if that fails the backend's
/// error is returned as [`Error::Operational`]. This layer adds no checks
/// of its own.
pub fn connect(
    backend: &dyn Backend,
    credentials: &Credentials,
    sanitizer: Option<Sanitizer>,
) -> Result<FakeConnection> {
    let session = backend.open(credentials).map_err(Error::operational)?;
    Ok(FakeConnection {
        session: RefCell::new(session),
        sanitizer,
    })
}

impl FakeConnection {
    pub fn cursor(&self) -> FakeCursor<'_> {
        FakeCursor {
            session: &self.session,
            sanitizer: self.sanitizer.as_ref(),
            state: CursorState::default(),
        }
    }
}

impl Connection for FakeConnection {
    fn cursor(&self) -> Box<dyn Cursor + '_> {
        Box::new(FakeConnection::cursor(self))
    }

    fn commit(&self) -> Result<()> {
        self.session.borrow_mut().commit().map_err(Error::sql)
    }

    fn rollback(&self) -> Result<()> {
        self.session.borrow_mut().rollback().map_err(Error::sql)
    }
}

pub struct FakeCursor<'c> {
    session: &'c RefCell<Box<dyn Session>>,
    sanitizer: Option<&'c Sanitizer>,
    state: CursorState,
}

impl<'c> FakeCursor<'c> {
    /// Pass one caller-controlled fragment through the sanitizer. A
    /// rejection is reported the way a database reports a bad statement.
    fn sanitize(&self, fragment: String) -> Result<String> {
        match self.sanitizer {
            Some(sanitizer) => sanitizer(&fragment).map_err(|rejection| {
                debug!("sanitizer rejected {:?}: {}", fragment, rejection);
                Error::Sql {
                    message: rejection.to_string(),
                    cause: None,
                }
            }),
            None => Ok(fragment),
        }
    }

    /// Only parameter text goes through the sanitizer. A query without
    /// parameters is application SQL and is forwarded untouched.
    fn build(&self, query: &str, params: Option<&[Value]>) -> Result<String> {
        match params {
            Some(params) => Template::parse(query)?.interpolate(params, |f| self.sanitize(f)),
            None => Ok(query.to_string()),
        }
    }
}

impl<'c> Cursor for FakeCursor<'c> {
    fn execute(&mut self, query: &str, params: Option<&[Value]>) -> Result<u64> {
        self.state.reset();

        let sql = self.build(query, params)?;
        debug!("executing concatenated {:?}", sql);

        self.state.set_last_query(sql.clone());
        let result = self
            .session
            .borrow_mut()
            .run(&sql, &[])
            .map_err(Error::sql)?;
        Ok(self.state.record(sql, result))
    }

    fn fetchone(&mut self) -> Option<Row> {
        self.state.fetchone()
    }

    fn fetchmany(&mut self, size: usize) -> Vec<Row> {
        self.state.fetchmany(size)
    }

    fn fetchall(&mut self) -> Vec<Row> {
        self.state.fetchall()
    }

    fn description(&self) -> &[String] {
        self.state.columns()
    }

    fn rowcount(&self) -> Option<u64> {
        self.state.rowcount()
    }

    fn lastrowid(&self) -> Option<u64> {
        self.state.lastrowid()
    }

    fn last_query(&self) -> Option<&str> {
        self.state.last_query()
    }
}
