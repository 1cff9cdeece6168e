// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use hashbrown::HashMap;

/// The origin-form request target: the path without its query, and the
/// query-string parameters broken out into an unordered map.
///
/// Parameter parsing rules: the query is split on `&`; each term is either
/// `key` (value defaults to the empty string) or `key=value`; whitespace
/// before a term is skipped; when a key occurs more than once the last
/// occurrence wins.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RequestTarget {
    pub path: String,
    pub parameters: HashMap<String, String>,
}

impl RequestTarget {
    /// Parse an origin-form target. Anything that does not begin with `/` is
    /// rejected.
    pub fn parse(input: &str) -> Option<Self> {
        if !input.starts_with('/') {
            return None;
        }

        let (path, query) = match input.split_once('?') {
            Some((path, query)) => (path, query),
            None => (input, ""),
        };

        let mut parameters = HashMap::new();
        for term in query.split('&') {
            let term = term.trim_start();
            if term.is_empty() {
                continue;
            }

            match term.split_once('=') {
                Some((key, value)) => parameters.insert(key.to_string(), value.to_string()),
                None => parameters.insert(term.to_string(), String::new()),
            };
        }

        Some(Self { path: path.to_string(), parameters })
    }

    /// Returns the path component, without the query.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Rebuild the target in request-line form. Parameter order is
    /// unspecified, the parameter *set* round-trips.
    #[must_use]
    pub fn to_target_string(&self) -> String {
        if self.parameters.is_empty() {
            return self.path.clone();
        }

        let query = self.parameters.iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    key.clone()
                } else {
                    format!("{key}={value}")
                }
            })
            .collect::<Vec<String>>()
            .join("&");

        format!("{}?{}", self.path, query)
    }
}
