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

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ctf_sql::{install_mode_override, Driver, Value};

/// Inspect or exercise the driver the current environment selects.
#[derive(Parser, Debug)]
#[command(name = "ctf-sql", version)]
struct Cli {
    /// Pin the mode instead of reading CTF_MODE
    #[arg(long, value_name = "FLAG")]
    mode: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the active mode, session and connection target
    Status,
    /// Run one statement; each PARAM fills the next %s
    Query {
        sql: String,
        params: Vec<String>,
    },
}

fn run(cli: Cli) -> ctf_sql::Result<()> {
    if let Some(flag) = cli.mode {
        install_mode_override(flag)?;
    }
    let driver = Driver::global()?;

    match cli.command {
        Command::Status => {
            let creds = driver.credentials();
            println!("mode:     {}", driver.mode());
            println!("session:  {}", driver.session_name());
            println!("backend:  {}", driver.backend_name());
            println!("host:     {}", creds.host);
            println!("user:     {}", creds.user);
            println!("database: {}", creds.database);
        }
        Command::Query { sql, params } => {
            let conn = driver.connect(None)?;
            let mut cur = conn.cursor();
            let params: Vec<Value> = params.into_iter().map(Value::from).collect();
            let count = if params.is_empty() {
                cur.execute(&sql, None)?
            } else {
                cur.execute(&sql, Some(params.as_slice()))?
            };

            if !cur.description().is_empty() {
                println!("{}", cur.description().join("\t"));
            }
            for row in cur.fetchall() {
                let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                println!("{}", cells.join("\t"));
            }
            eprintln!("{} row(s)", count);
            conn.commit()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ctf-sql: {}", e);
            ExitCode::FAILURE
        }
    }
}
