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

//! The calling surface shared by both drivers
//!
//! Application code is written against [`Connection`] and [`Cursor`] and
//! does not change when the process runs in challenge mode.

use std::collections::VecDeque;

use crate::error::Result;
use crate::value::{ResultSet, Row, Value};

pub trait Connection {
    fn cursor(&self) -> Box<dyn Cursor + '_>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;
}

pub trait Cursor {
    /// Run `query`. With `params`, every `%s` in the query takes one value
    /// and `%%` stands for a literal `%`; without, the query is sent as is.
    ///
    /// Returns the row count: rows returned by a query, or rows changed by
    /// a write.
    fn execute(&mut self, query: &str, params: Option<&[Value]>) -> Result<u64>;

    /// Run `query` once per parameter set. Returns the summed row count.
    fn executemany(&mut self, query: &str, param_sets: &[Vec<Value>]) -> Result<u64> {
        let mut count = 0;
        for params in param_sets {
            count += self.execute(query, Some(params.as_slice()))?;
        }
        Ok(count)
    }

    fn fetchone(&mut self) -> Option<Row>;

    fn fetchmany(&mut self, size: usize) -> Vec<Row>;

    fn fetchall(&mut self) -> Vec<Row>;

    /// Column names of the last result, empty for write statements.
    fn description(&self) -> &[String];

    fn rowcount(&self) -> Option<u64>;

    fn lastrowid(&self) -> Option<u64>;

    /// The SQL text last handed to the database.
    fn last_query(&self) -> Option<&str>;
}

/// Result bookkeeping common to both cursor kinds.
#[derive(Debug, Default)]
pub(crate) struct CursorState {
    columns: Vec<String>,
    pending: VecDeque<Row>,
    rowcount: Option<u64>,
    lastrowid: Option<u64>,
    last_query: Option<String>,
}

impl CursorState {
    /// Forget the previous result before a new statement runs, so a failed
    /// execute leaves nothing stale to fetch.
    pub(crate) fn reset(&mut self) {
        *self = CursorState::default();
    }

    pub(crate) fn record(&mut self, sql: String, result: ResultSet) -> u64 {
        let rowcount = result.rowcount();
        self.rowcount = Some(rowcount);
        self.lastrowid = result.last_insert_id;
        self.columns = result.columns;
        self.pending = result.rows.into();
        self.last_query = Some(sql);
        rowcount
    }

    pub(crate) fn set_last_query(&mut self, sql: String) {
        self.last_query = Some(sql);
    }

    pub(crate) fn fetchone(&mut self) -> Option<Row> {
        self.pending.pop_front()
    }

    pub(crate) fn fetchmany(&mut self, size: usize) -> Vec<Row> {
        let n = size.min(self.pending.len());
        self.pending.drain(..n).collect()
    }

    pub(crate) fn fetchall(&mut self) -> Vec<Row> {
        self.pending.drain(..).collect()
    }

    pub(crate) fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn rowcount(&self) -> Option<u64> {
        self.rowcount
    }

    pub(crate) fn lastrowid(&self) -> Option<u64> {
        self.lastrowid
    }

    pub(crate) fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }
}
