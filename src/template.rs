//! URI template matching.
//!
//! Supports the subset of RFC 6570 that is useful for matching requests:
//! simple (`{id}`), reserved (`{+path}`), path segment (`{/segment}`),
//! query (`{?page,count}`), query continuation (`{&page}`) and fragment
//! (`{#section}`) expressions. Prefix (`:3`) and explode (`*`) modifiers
//! are accepted and ignored.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{MockingjayError, Result};

/// A compiled URI template.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    regex: Regex,
    variables: Vec<String>,
}

impl UriTemplate {
    /// Compile `template`.
    ///
    /// # Errors
    ///
    /// Returns [`MockingjayError::InvalidTemplate`] for unbalanced braces or
    /// empty expressions.
    pub fn new(template: &str) -> Result<Self> {
        let invalid = |reason: &str| MockingjayError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut pattern = String::from("^");
        let mut variables = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find(['{', '}']) {
            if rest[open..].starts_with('}') {
                return Err(invalid("unexpected '}'"));
            }
            pattern.push_str(&regex::escape(&rest[..open]));

            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| invalid("unclosed '{'"))?;
            let expression = &after[..close];
            if expression.contains('{') {
                return Err(invalid("nested '{'"));
            }

            let (operator, names) = split_operator(expression);
            let names: Vec<String> = names
                .split(',')
                .map(|name| name.trim_end_matches('*').split(':').next().unwrap_or(""))
                .map(str::to_string)
                .collect();
            if names.iter().any(String::is_empty) {
                return Err(invalid("empty variable name"));
            }

            pattern.push_str(&expression_pattern(operator, &names));
            variables.extend(names);
            rest = &after[close + 1..];
        }

        if rest.contains('}') {
            return Err(invalid("unexpected '}'"));
        }
        pattern.push_str(&regex::escape(rest));
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            template: template.to_string(),
            regex,
            variables,
        })
    }

    /// The template source.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Names of the template's variables, in order of appearance.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Match `candidate` and return the percent-decoded variable values.
    ///
    /// Variables of optional expressions that did not participate are
    /// omitted.
    pub fn extract(&self, candidate: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(candidate)?;

        let values = self
            .variables
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let raw = captures.get(i + 1)?.as_str();
                let value = urlencoding::decode(raw)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                Some((name.clone(), value))
            })
            .collect();

        Some(values)
    }
}

fn split_operator(expression: &str) -> (Option<char>, &str) {
    match expression.chars().next() {
        Some(op @ ('+' | '#' | '/' | '?' | '&' | '.' | ';')) => (Some(op), &expression[1..]),
        _ => (None, expression),
    }
}

fn expression_pattern(operator: Option<char>, names: &[String]) -> String {
    match operator {
        None => names
            .iter()
            .map(|_| "([^/?#&,]*)")
            .collect::<Vec<_>>()
            .join(","),
        Some('+') => names
            .iter()
            .map(|_| "([^#]*?)")
            .collect::<Vec<_>>()
            .join(","),
        Some('#') => format!(
            "(?:#{})?",
            names.iter().map(|_| "(.*?)").collect::<Vec<_>>().join(",")
        ),
        Some('/') => names.iter().map(|_| "(?:/([^/?#]*))?").collect(),
        Some('.') => names.iter().map(|_| r"(?:\.([^/?#.]*))?").collect(),
        Some(';') => names
            .iter()
            .map(|name| format!(";{}(?:=([^/?#;]*))?", regex::escape(name)))
            .collect(),
        // '?' and '&'
        Some(_) => names
            .iter()
            .map(|name| format!("(?:[?&]{}=([^&#]*))?", regex::escape(name)))
            .collect(),
    }
}
