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

//! Normal-mode driver: parameters are always bound by the backend.

use std::cell::RefCell;

use log::debug;

use crate::backend::{Backend, Session, MARKER};
use crate::config::Credentials;
use crate::cursor::{Connection, Cursor, CursorState};
use crate::error::{Error, Result};
use crate::template::Template;
use crate::value::{Row, Value};

pub struct RealConnection {
    session: RefCell<Box<dyn Session>>,
}

pub fn connect(backend: &dyn Backend, credentials: &Credentials) -> Result<RealConnection> {
    let session = backend.open(credentials).map_err(Error::operational)?;
    Ok(RealConnection {
        session: RefCell::new(session),
    })
}

impl RealConnection {
    pub fn cursor(&self) -> RealCursor<'_> {
        RealCursor {
            session: &self.session,
            state: CursorState::default(),
        }
    }
}

impl Connection for RealConnection {
    fn cursor(&self) -> Box<dyn Cursor + '_> {
        Box::new(RealConnection::cursor(self))
    }

    fn commit(&self) -> Result<()> {
        self.session.borrow_mut().commit().map_err(Error::sql)
    }

    fn rollback(&self) -> Result<()> {
        self.session.borrow_mut().rollback().map_err(Error::sql)
    }
}

pub struct RealCursor<'c> {
    session: &'c RefCell<Box<dyn Session>>,
    state: CursorState,
}

impl<'c> Cursor for RealCursor<'c> {
    fn execute(&mut self, query: &str, params: Option<&[Value]>) -> Result<u64> {
        self.state.reset();

        let (sql, params) = match params {
            Some(params) => (Template::parse(query)?.to_positional(params, MARKER)?, params),
            None => (query.to_string(), &[][..]),
        };
        debug!("executing {:?} with {} bound parameters", sql, params.len());

        self.state.set_last_query(sql.clone());
        let result = self
            .session
            .borrow_mut()
            .run(&sql, params)
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
