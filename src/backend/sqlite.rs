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

//! SQLite backend
//!
//! The database name is the file path, `:memory:` opens a private
//! in-memory database. Host, user and password are ignored.

use log::info;
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection};

use super::{Backend, Session};
use crate::config::Credentials;
use crate::error::BackendError;
use crate::value::{ResultSet, Row, Value};

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteBackend;

impl Backend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn open(&self, credentials: &Credentials) -> Result<Box<dyn Session>, BackendError> {
        info!("opening sqlite database {}", credentials.database);
        let conn = if credentials.database == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(&credentials.database)?
        };
        Ok(Box::new(SqliteSession { conn }))
    }
}

pub struct SqliteSession {
    conn: Connection,
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Int(v) => SqliteValue::Integer(*v),
        // SQLite integers are signed 64 bit
        Value::UInt(v) => match i64::try_from(*v) {
            Ok(v) => SqliteValue::Integer(v),
            Err(_) => SqliteValue::Text(v.to_string()),
        },
        Value::Float(v) => SqliteValue::Real(*v),
        Value::Text(v) => SqliteValue::Text(v.clone()),
        Value::Bytes(v) => SqliteValue::Blob(v.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Int(v),
        ValueRef::Real(v) => Value::Float(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Bytes(v.to_vec()),
    }
}

impl Session for SqliteSession {
    fn run(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, BackendError> {
        let mut stmt = self.conn.prepare(sql)?;
        let params = params_from_iter(params.iter().map(to_sqlite));

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        if columns.is_empty() {
            let affected = stmt.execute(params)? as u64;
            return Ok(ResultSet {
                columns,
                rows: Vec::new(),
                affected,
                last_insert_id: u64::try_from(self.conn.last_insert_rowid()).ok(),
            });
        }

        let width = columns.len();
        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells: Row = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(from_sqlite(row.get_ref(i)?));
            }
            out.push(cells);
        }

        Ok(ResultSet {
            columns,
            rows: out,
            affected: 0,
            last_insert_id: None,
        })
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }
}
