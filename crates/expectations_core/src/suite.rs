//! Named, ordered rule collections.

use crate::Rule;
use serde::{Deserialize, Serialize};

/// An ordered collection of rules for one pipeline stage.
///
/// Suites are immutable once built and can be shared read-only across
/// concurrent validations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SuiteDef")]
pub struct Suite {
    name: String,
    description: Option<String>,
    rules: Vec<Rule>,
}

/// Serialized form; names are normalized on the way in.
#[derive(Deserialize)]
struct SuiteDef {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    rules: Vec<Rule>,
}

impl From<SuiteDef> for Suite {
    fn from(def: SuiteDef) -> Self {
        Suite {
            name: def.name,
            description: def.description,
            rules: def.rules.into_iter().map(Rule::normalized).collect(),
        }
    }
}

impl Suite {
    /// Starts a [`SuiteBuilder`].
    pub fn builder(name: impl Into<String>) -> SuiteBuilder {
        SuiteBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns true if any rule reads the named column.
    pub fn references_column(&self, column: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.target_columns().contains(&column))
    }
}

/// Builder for a [`Suite`].
///
/// # Example
///
/// ```rust
/// use expectations_core::{RuleBuilder, Suite};
///
/// let suite = Suite::builder("raw_housing_data")
///     .description("Raw CSV input")
///     .rule(RuleBuilder::not_null("LotArea").build())
///     .build();
/// assert_eq!(suite.len(), 1);
/// ```
#[derive(Debug)]
pub struct SuiteBuilder {
    name: String,
    description: Option<String>,
    rules: Vec<Rule>,
}

impl SuiteBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            rules: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends several rules in order.
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Appends a rule only when `condition` holds.
    pub fn rule_if(self, condition: bool, rule: impl FnOnce() -> Rule) -> Self {
        if condition { self.rule(rule()) } else { self }
    }

    pub fn build(self) -> Suite {
        Suite {
            name: self.name,
            description: self.description,
            rules: self.rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleBuilder;
    use serde_json::json;

    #[test]
    fn test_builder_keeps_order() {
        let suite = Suite::builder("s")
            .rule(RuleBuilder::not_null("a").build())
            .rule_if(false, || RuleBuilder::not_null("skipped").build())
            .rules(vec![
                RuleBuilder::not_null("b").build(),
                RuleBuilder::not_null("c").build(),
            ])
            .build();

        let names: Vec<&str> = suite.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["not_null:a", "not_null:b", "not_null:c"]);
        assert!(!suite.references_column("skipped"));
        assert!(suite.references_column("b"));
    }

    #[test]
    fn test_deserialize_normalizes_names() {
        let suite: Suite = serde_json::from_value(json!({
            "name": "custom",
            "rules": [
                { "type": "not_null", "column": "x" },
                { "name": "pair", "type": "column_pair_gte", "column_a": "x", "column_b": "y" }
            ]
        }))
        .unwrap();

        assert_eq!(suite.name(), "custom");
        assert_eq!(suite.rules()[0].name, "not_null:x");
        assert_eq!(suite.rules()[1].name, "pair");
    }
}
