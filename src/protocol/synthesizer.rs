// src/protocol/synthesizer.rs

use crate::protocol::{KeywordSet, ResultRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Trait for producing the result cards shown after a run.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, command: &str) -> Vec<ResultRecord>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCategory {
    Laptops,
    Phones,
    SearchHits,
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResultCategory::Laptops => "laptops",
            ResultCategory::Phones => "phones",
            ResultCategory::SearchHits => "search_hits",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct ResultRule {
    category: ResultCategory,
    keywords: KeywordSet,
    records: Vec<ResultRecord>,
}

impl ResultRule {
    pub fn new(
        category: ResultCategory,
        keywords: &[&str],
        records: Vec<ResultRecord>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            category,
            keywords: KeywordSet::new(keywords)?,
            records,
        })
    }

    pub fn matches(&self, command: &str) -> bool {
        self.keywords.matches(command)
    }

    pub fn category(&self) -> ResultCategory {
        self.category
    }
}

/// Ordered rule table, first match wins, generic search hits otherwise.
#[derive(Clone, Debug)]
pub struct RuleSynthesizer {
    rules: Vec<ResultRule>,
    fallback: Vec<ResultRecord>,
}

impl RuleSynthesizer {
    pub fn new(fallback: Vec<ResultRecord>) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn standard() -> Result<Self, regex::Error> {
        Ok(Self::new(search_hit_records())
            .with_rule(ResultRule::new(
                ResultCategory::Laptops,
                &["laptop", "computer"],
                laptop_records(),
            )?)
            .with_rule(ResultRule::new(
                ResultCategory::Phones,
                &["phone", "mobile"],
                phone_records(),
            )?))
    }

    pub fn with_rule(mut self, rule: ResultRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Category the command resolves to, `SearchHits` when nothing matches.
    pub fn categorize(&self, command: &str) -> ResultCategory {
        self.rules
            .iter()
            .find(|rule| rule.matches(command))
            .map(ResultRule::category)
            .unwrap_or(ResultCategory::SearchHits)
    }
}

impl Synthesizer for RuleSynthesizer {
    fn synthesize(&self, command: &str) -> Vec<ResultRecord> {
        match self.rules.iter().find(|rule| rule.matches(command)) {
            Some(rule) => {
                debug!(category = %rule.category, count = rule.records.len(), "synthesized results");
                rule.records.clone()
            }
            None => {
                debug!(category = %ResultCategory::SearchHits, count = self.fallback.len(), "synthesized results");
                self.fallback.clone()
            }
        }
    }
}

fn product(name: &str, price: &str, rating: &str, specs: &str, url: &str) -> ResultRecord {
    ResultRecord::from_pairs(&[
        ("name", name),
        ("price", price),
        ("rating", rating),
        ("specs", specs),
        ("url", url),
    ])
}

fn search_hit(title: &str, description: &str, url: &str, relevance: &str) -> ResultRecord {
    ResultRecord::from_pairs(&[
        ("title", title),
        ("description", description),
        ("url", url),
        ("relevance", relevance),
    ])
}

pub fn laptop_records() -> Vec<ResultRecord> {
    vec![
        product(
            "Dell XPS 13",
            "₹89,999",
            "4.5/5",
            "11th Gen Intel Core i5, 8GB RAM, 256GB SSD",
            "https://example.com/dell-xps-13",
        ),
        product(
            "MacBook Air M2",
            "₹1,14,900",
            "4.7/5",
            "Apple M2 Chip, 8GB RAM, 256GB SSD",
            "https://example.com/macbook-air-m2",
        ),
        product(
            "HP Pavilion 14",
            "₹65,999",
            "4.2/5",
            "AMD Ryzen 5, 8GB RAM, 512GB SSD",
            "https://example.com/hp-pavilion-14",
        ),
        product(
            "Lenovo ThinkPad E14",
            "₹72,500",
            "4.4/5",
            "11th Gen Intel Core i5, 8GB RAM, 256GB SSD",
            "https://example.com/lenovo-thinkpad-e14",
        ),
        product(
            "ASUS VivoBook 15",
            "₹55,990",
            "4.1/5",
            "Intel Core i3, 4GB RAM, 256GB SSD",
            "https://example.com/asus-vivobook-15",
        ),
    ]
}

pub fn phone_records() -> Vec<ResultRecord> {
    vec![
        product(
            "iPhone 14",
            "₹79,900",
            "4.6/5",
            "A15 Bionic, 6.1\" Display, 128GB",
            "https://example.com/iphone-14",
        ),
        product(
            "Samsung Galaxy S23",
            "₹74,999",
            "4.5/5",
            "Snapdragon 8 Gen 2, 6.1\" Display, 256GB",
            "https://example.com/samsung-s23",
        ),
        product(
            "OnePlus 11",
            "₹56,999",
            "4.4/5",
            "Snapdragon 8 Gen 2, 6.7\" Display, 128GB",
            "https://example.com/oneplus-11",
        ),
    ]
}

pub fn search_hit_records() -> Vec<ResultRecord> {
    vec![
        search_hit(
            "Search Result 1",
            "Relevant information based on your query",
            "https://example.com/result1",
            "95%",
        ),
        search_hit(
            "Search Result 2",
            "Additional information matching your criteria",
            "https://example.com/result2",
            "89%",
        ),
        search_hit(
            "Search Result 3",
            "Related content for your search query",
            "https://example.com/result3",
            "82%",
        ),
    ]
}
