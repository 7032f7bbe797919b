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

//! Challenge sanitizers
//!
//! A sanitizer is the filter a challenge author puts in front of the unsafe
//! concatenation. It receives each raw fragment and returns the text to
//! splice in, or a [`Rejection`], which the driver reports as an SQL error.
//!
//! ```rust
//! use ctf_sql::sanitize::{chain, deny_substrings, replace_once};
//!
//! // Level 2: strips the first "OR" and refuses comments.
//! let filter = chain(vec![replace_once("OR", ""), deny_substrings(&["--", "#"])]);
//! assert_eq!(filter("1 OR 1=1").unwrap(), "1  1=1");
//! assert_eq!(filter("1 OORR 1=1").unwrap(), "1 OR 1=1");
//! assert!(filter("1 -- ").is_err());
//! ```

use std::sync::Arc;

use thiserror::Error;

/// Value-level failure raised by a sanitizer.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct Rejection(pub String);

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Rejection(message.into())
    }
}

pub type Sanitizer = Arc<dyn Fn(&str) -> Result<String, Rejection> + Send + Sync>;

/// Wrap a plain closure.
pub fn sanitizer<F>(f: F) -> Sanitizer
where
    F: Fn(&str) -> Result<String, Rejection> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Reject any fragment containing one of `needles`, ignoring ASCII case.
pub fn deny_substrings(needles: &[&str]) -> Sanitizer {
    let needles: Vec<String> = needles.iter().map(|n| n.to_ascii_lowercase()).collect();
    Arc::new(move |fragment: &str| {
        let lowered = fragment.to_ascii_lowercase();
        match needles.iter().find(|n| lowered.contains(n.as_str())) {
            Some(needle) => Err(Rejection(format!("forbidden input: {}", needle))),
            None => Ok(fragment.to_string()),
        }
    })
}

/// Replace every occurrence of `pattern` once, without rescanning the
/// result. Nested payloads such as `OORR` survive on purpose.
pub fn replace_once(pattern: &str, replacement: &str) -> Sanitizer {
    let pattern = pattern.to_string();
    let replacement = replacement.to_string();
    Arc::new(move |fragment: &str| Ok(fragment.replace(&pattern, &replacement)))
}

pub fn max_length(limit: usize) -> Sanitizer {
    Arc::new(move |fragment: &str| {
        let len = fragment.chars().count();
        if len > limit {
            Err(Rejection(format!("input too long: {} > {}", len, limit)))
        } else {
            Ok(fragment.to_string())
        }
    })
}

/// Run sanitizers left to right, each seeing the previous one's output.
pub fn chain(stages: Vec<Sanitizer>) -> Sanitizer {
    Arc::new(move |fragment: &str| {
        stages
            .iter()
            .try_fold(fragment.to_string(), |acc, stage| stage(&acc))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_is_case_insensitive() {
        let s = deny_substrings(&["union"]);
        assert_eq!(
            s("1 UNION SELECT 1").unwrap_err(),
            Rejection::new("forbidden input: union")
        );
        assert_eq!(s("1").unwrap(), "1");
    }

    #[test]
    fn max_length_counts_chars() {
        let s = max_length(3);
        assert_eq!(s("äöü").unwrap(), "äöü");
        assert_eq!(s("1234").unwrap_err().to_string(), "input too long: 4 > 3");
    }

    #[test]
    fn chain_stops_at_first_rejection() {
        let s = chain(vec![
            replace_once(" ", ""),
            deny_substrings(&["or1=1"]),
            sanitizer(|_| panic!("not reached")),
        ]);
        assert!(s("x or 1=1").is_err());
    }

    #[test]
    fn empty_chain_is_identity() {
        let s = chain(vec![]);
        assert_eq!(s("abc").unwrap(), "abc");
    }
}
