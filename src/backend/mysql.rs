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

//! MySQL backend
//!
//! Statements without parameters go over the text protocol, so a
//! concatenated query reaches the server exactly as built. Statements with
//! parameters are prepared and bound.

use log::info;
use mysql::prelude::{Protocol, Queryable};
use mysql::{Conn, OptsBuilder, Params, QueryResult, Value as MysqlValue};

use super::{Backend, Session};
use crate::config::Credentials;
use crate::error::BackendError;
use crate::value::{ResultSet, Value};

#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlBackend;

impl Backend for MysqlBackend {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn open(&self, credentials: &Credentials) -> Result<Box<dyn Session>, BackendError> {
        info!(
            "connecting to mysql {}@{}/{}",
            credentials.user, credentials.host, credentials.database
        );
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(credentials.host.as_str()))
            .user(Some(credentials.user.as_str()))
            .pass(Some(credentials.password.as_str()))
            .db_name(Some(credentials.database.as_str()));
        let conn = Conn::new(opts)?;
        Ok(Box::new(MysqlSession { conn }))
    }
}

pub struct MysqlSession {
    conn: Conn,
}

fn to_mysql(value: &Value) -> MysqlValue {
    match value {
        Value::Null => MysqlValue::NULL,
        Value::Int(v) => MysqlValue::Int(*v),
        Value::UInt(v) => MysqlValue::UInt(*v),
        Value::Float(v) => MysqlValue::Double(*v),
        Value::Text(v) => MysqlValue::Bytes(v.as_bytes().to_vec()),
        Value::Bytes(v) => MysqlValue::Bytes(v.clone()),
    }
}

fn from_mysql(value: MysqlValue) -> Value {
    match value {
        MysqlValue::NULL => Value::Null,
        MysqlValue::Int(v) => Value::Int(v),
        MysqlValue::UInt(v) => Value::UInt(v),
        MysqlValue::Float(v) => Value::Float(v.into()),
        MysqlValue::Double(v) => Value::Float(v),
        MysqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Value::Text(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        // dates and times as MySQL spells them, without the quotes
        other => Value::Text(other.as_sql(true).trim_matches('\'').to_string()),
    }
}

fn collect<P: Protocol>(
    mut result: QueryResult<'_, '_, '_, P>,
) -> Result<ResultSet, BackendError> {
    let columns: Vec<String> = result
        .columns()
        .as_ref()
        .iter()
        .map(|c| c.name_str().into_owned())
        .collect();

    let mut rows = Vec::new();
    for row in result.by_ref() {
        rows.push(row?.unwrap().into_iter().map(from_mysql).collect());
    }

    Ok(ResultSet {
        columns,
        rows,
        affected: result.affected_rows(),
        last_insert_id: result.last_insert_id(),
    })
}

impl Session for MysqlSession {
    fn run(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet, BackendError> {
        if params.is_empty() {
            collect(self.conn.query_iter(sql)?)
        } else {
            let params = Params::Positional(params.iter().map(to_mysql).collect());
            collect(self.conn.exec_iter(sql, params)?)
        }
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.conn.query_drop("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        self.conn.query_drop("ROLLBACK")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_map_both_ways() {
        assert_eq!(to_mysql(&Value::Null), MysqlValue::NULL);
        assert_eq!(to_mysql(&"x".into()), MysqlValue::Bytes(b"x".to_vec()));
        assert_eq!(
            from_mysql(MysqlValue::Bytes(b"abc".to_vec())),
            Value::Text("abc".to_string())
        );
        assert_eq!(from_mysql(MysqlValue::Bytes(vec![0xff])), Value::Bytes(vec![0xff]));
    }
}
