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

//! Query templates
//!
//! A [`Template`] is a tokenized query with `%s` slots. It can be turned
//! into a statement two ways: [`Template::interpolate`] splices raw values
//! into the text (the challenge path), [`Template::to_positional`] rewrites
//! the slots into backend markers so the values can be bound.

use log::debug;

use crate::error::{Error, Result};
use crate::tokenizer::{Token, Tokenizer};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn parse(query: &str) -> Result<Self> {
        let tokens = Tokenizer::new(query).tokenize()?;
        Ok(Template { tokens })
    }

    pub fn placeholders(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Placeholder))
            .count()
    }

    fn check_arity(&self, params: &[Value]) -> Result<()> {
        let placeholders = self.placeholders();
        if placeholders != params.len() {
            return Err(Error::Programming(format!(
                "placeholder count mismatch: {} != {}",
                placeholders,
                params.len()
            )));
        }
        Ok(())
    }

    /// Build the final SQL by pasting each value's raw form in place of its
    /// `%s`. `filter` sees every raw fragment first and may rewrite it or
    /// fail the whole statement.
    pub fn interpolate<F>(&self, params: &[Value], mut filter: F) -> Result<String>
    where
        F: FnMut(String) -> Result<String>,
    {
        self.check_arity(params)?;

        let mut params = params.iter();
        let mut sql = String::new();
        for token in &self.tokens {
            match token {
                Token::Text(s) => sql.push_str(s),
                Token::Percent => sql.push('%'),
                Token::Placeholder => {
                    // arity was checked above
                    if let Some(value) = params.next() {
                        sql.push_str(&filter(value.to_string())?);
                    }
                }
            }
        }
        debug!("interpolated {:?}", sql);
        Ok(sql)
    }

    /// Rewrite `%s` into `marker` and `%%` into `%`, leaving values for the
    /// backend to bind.
    pub fn to_positional(&self, params: &[Value], marker: &str) -> Result<String> {
        self.check_arity(params)?;

        let mut sql = String::new();
        for token in &self.tokens {
            match token {
                Token::Text(s) => sql.push_str(s),
                Token::Percent => sql.push('%'),
                Token::Placeholder => sql.push_str(marker),
            }
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    fn no_filter(s: String) -> Result<String> {
        Ok(s)
    }

    #[test]
    fn interpolates_without_escaping() {
        let template = Template::parse("SELECT * FROM users WHERE name = '%s'").unwrap();
        let sql = template
            .interpolate(&["' OR '1'='1".into()], no_filter)
            .unwrap();
        assert_eq!(sql, "SELECT * FROM users WHERE name = '' OR '1'='1'");
    }

    #[test]
    fn null_is_spelled_out() {
        let template = Template::parse("INSERT INTO t VALUES (%s, %s)").unwrap();
        let sql = template
            .interpolate(&[Value::Null, 7.into()], no_filter)
            .unwrap();
        assert_eq!(sql, "INSERT INTO t VALUES (NULL, 7)");
    }

    #[test]
    fn arity_mismatch_is_a_programming_error() {
        let template = Template::parse("SELECT %s, %s").unwrap();
        let err = template.interpolate(&[1.into()], no_filter).unwrap_err();
        assert_matches!(err, Error::Programming(ref m) if m == "placeholder count mismatch: 2 != 1");

        let err = template.to_positional(&[], "?").unwrap_err();
        assert_matches!(err, Error::Programming(_));
    }

    #[test]
    fn filter_sees_each_fragment_and_can_abort() {
        let template = Template::parse("SELECT %s, %s").unwrap();
        let mut seen = Vec::new();
        let sql = template
            .interpolate(&["a".into(), "b".into()], |s| {
                seen.push(s.clone());
                Ok(s.to_uppercase())
            })
            .unwrap();
        assert_eq!(sql, "SELECT A, B");
        assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);

        let err = template
            .interpolate(&["a".into(), "b".into()], |_| {
                Err(Error::Programming("stop".to_string()))
            })
            .unwrap_err();
        assert_matches!(err, Error::Programming(_));
    }

    #[test]
    fn positional_rewrite_keeps_literal_percent() {
        let template = Template::parse("SELECT * FROM t WHERE name LIKE 'a%%' AND id = %s").unwrap();
        let sql = template.to_positional(&[1.into()], "?").unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE name LIKE 'a%' AND id = ?");
    }

    #[test]
    fn bad_format_character_is_rejected() {
        let err = Template::parse("SELECT %d").unwrap_err();
        assert_matches!(err, Error::Programming(_));
    }
}
