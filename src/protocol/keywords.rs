// src/protocol/keywords.rs

use regex::{Regex, RegexBuilder};

/// Case-insensitive substring matcher over a fixed keyword list.
#[derive(Clone, Debug)]
pub struct KeywordSet {
    /// `None` for an empty keyword list, which matches nothing.
    pattern: Option<Regex>,
}

impl KeywordSet {
    pub fn new(keywords: &[&str]) -> Result<Self, regex::Error> {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = if keywords.is_empty() {
            None
        } else {
            Some(
                RegexBuilder::new(&alternation)
                    .case_insensitive(true)
                    .build()?,
            )
        };

        Ok(Self { pattern })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}
