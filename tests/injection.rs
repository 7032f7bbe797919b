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

#![cfg(feature = "sqlite")]

use ctf_sql::backend::sqlite::SqliteBackend;
use ctf_sql::challenge::{connect, Error, FakeConnection, FakeCursor};
use ctf_sql::sanitize::{chain, deny_substrings, replace_once};
use ctf_sql::{Credentials, Cursor, Value};
use matches::assert_matches;

const LOOKUP: &str = "SELECT name FROM users WHERE id = %s";
const LOGIN: &str = "SELECT name FROM users WHERE name = '%s' AND password = '%s'";

fn init_logging() {
    let _ = simple_logger::SimpleLogger::new().init();
}

fn challenge_db(sanitizer: Option<ctf_sql::Sanitizer>) -> FakeConnection {
    init_logging();
    let conn = connect(
        &SqliteBackend,
        &Credentials::new("127.0.0.1", "ctf_user", "", ":memory:"),
        sanitizer,
    )
    .unwrap();
    {
        let mut cur = conn.cursor();
        cur.execute(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, password TEXT)",
            None,
        )
        .unwrap();
        cur.execute(
            "INSERT INTO users (name, password) VALUES \
             ('admin', 'CTF{union_all_the_things}'), ('alice', 'pw1'), ('bob', 'pw2')",
            None,
        )
        .unwrap();
    }
    conn
}

fn names(cur: &mut FakeCursor<'_>) -> Vec<String> {
    cur.fetchall()
        .into_iter()
        .map(|row| row[0].to_string())
        .collect()
}

#[test]
fn tautology_broadens_the_result_set() {
    let conn = challenge_db(None);
    let mut cur = conn.cursor();

    assert_eq!(cur.execute(LOOKUP, Some(&[Value::from("1")])).unwrap(), 1);
    assert_eq!(names(&mut cur), vec!["admin"]);

    assert_eq!(
        cur.execute(LOOKUP, Some(&[Value::from("1 OR 1=1")])).unwrap(),
        3
    );
    assert_eq!(names(&mut cur), vec!["admin", "alice", "bob"]);
    assert_eq!(
        cur.last_query(),
        Some("SELECT name FROM users WHERE id = 1 OR 1=1")
    );
}

#[test]
fn comment_bypasses_password_check() {
    let conn = challenge_db(None);
    let mut cur = conn.cursor();

    cur.execute(LOGIN, Some(&["admin".into(), "wrong".into()]))
        .unwrap();
    assert!(names(&mut cur).is_empty());

    cur.execute(LOGIN, Some(&["admin' --".into(), "".into()]))
        .unwrap();
    assert_eq!(names(&mut cur), vec!["admin"]);
}

#[test]
fn union_leaks_another_column() {
    let conn = challenge_db(None);
    let mut cur = conn.cursor();
    cur.execute(
        LOOKUP,
        Some(&["0 UNION SELECT password FROM users WHERE name = 'admin'".into()]),
    )
    .unwrap();
    assert_eq!(names(&mut cur), vec!["CTF{union_all_the_things}"]);
}

#[test]
fn sanitizer_blocks_then_lets_clean_input_through() {
    let conn = challenge_db(Some(deny_substrings(&["union"])));
    let mut cur = conn.cursor();

    let err = cur
        .execute(LOOKUP, Some(&["0 UNION SELECT password FROM users".into()]))
        .unwrap_err();
    assert_matches!(err, Error::Sql { cause: None, .. });
    assert!(cur.fetchall().is_empty());

    cur.execute(LOOKUP, Some(&["2".into()])).unwrap();
    assert_eq!(names(&mut cur), vec!["alice"]);
}

#[test]
fn filter_leaves_application_sql_alone() {
    // The seed data itself mentions "union"; only parameters are filtered.
    let conn = challenge_db(Some(deny_substrings(&["union"])));
    let mut cur = conn.cursor();

    cur.execute("SELECT password FROM users WHERE name = 'admin'", None)
        .unwrap();
    assert_eq!(
        cur.fetchall(),
        vec![vec![Value::from("CTF{union_all_the_things}")]]
    );

    let err = cur
        .execute(LOOKUP, Some(&["1 UNION SELECT password FROM users".into()]))
        .unwrap_err();
    assert_matches!(err, Error::Sql { cause: None, .. });
}

#[test]
fn naive_filter_can_be_bypassed() {
    let filter = chain(vec![replace_once("OR", ""), replace_once("or", "")]);
    let conn = challenge_db(Some(filter));
    let mut cur = conn.cursor();

    cur.execute(LOOKUP, Some(&["1 OR 1=1".into()])).unwrap_err();

    cur.execute(LOOKUP, Some(&["1 OORR 1=1".into()])).unwrap();
    assert_eq!(names(&mut cur).len(), 3);
}

#[test]
fn database_errors_pass_through_with_cause() {
    let conn = challenge_db(None);
    let mut cur = conn.cursor();
    let err = cur
        .execute(LOOKUP, Some(&["1 UNION SELECT".into()]))
        .unwrap_err();
    assert_matches!(err, Error::Sql { cause: Some(_), .. });
    assert_eq!(
        cur.last_query(),
        Some("SELECT name FROM users WHERE id = 1 UNION SELECT")
    );
}

#[test]
fn executemany_concatenates_each_row() {
    let conn = challenge_db(None);
    let mut cur = conn.cursor();
    let n = cur
        .executemany(
            "INSERT INTO users (name, password) VALUES ('%s', '%s')",
            &[
                vec![Value::from("carol"), Value::from("pw3")],
                vec![Value::from("dave"), Value::from("pw4")],
            ],
        )
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(cur.lastrowid(), Some(5));

    cur.execute("SELECT COUNT(*) FROM users", None).unwrap();
    assert_eq!(cur.fetchone(), Some(vec![Value::Int(5)]));
    assert_eq!(cur.description(), ["COUNT(*)".to_string()]);
}
