//! @ai:module:intent API design checks over extracted attribute schemas
//! @ai:module:layer application
//! @ai:module:public_api Rule, RuleSet, MissingDescription, ReservedName, DanglingConflict
//! @ai:module:depends_on model, config
//! @ai:module:stateless true

use crate::config::RuleSettings;
use crate::model::{AttributeRecord, Location, Schema, Violation};
use std::collections::BTreeSet;
use std::path::Path;

/// @ai:intent One independent check over an attribute and its enclosing root schema
pub trait Rule {
    fn code(&self) -> &'static str;

    /// Whether the rule also applies to attributes of nested block schemas.
    fn descends(&self) -> bool {
        true
    }

    /// Returns the violation message, or None when the attribute passes.
    fn check(&self, attribute: &AttributeRecord, enclosing: &Schema) -> Option<String>;
}

/// @ai:intent Fails when an inline attribute has no Description property at all
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingDescription;

impl Rule for MissingDescription {
    fn code(&self) -> &'static str {
        "S001"
    }

    fn check(&self, attribute: &AttributeRecord, _enclosing: &Schema) -> Option<String> {
        if !attribute.inline || attribute.has_description {
            return None;
        }
        Some(format!("{}: Missing Description attribute", attribute.name))
    }
}

/// @ai:intent Fails when a top-level attribute uses a reserved name; case-sensitive
#[derive(Debug, Clone)]
pub struct ReservedName {
    names: Vec<String>,
}

impl ReservedName {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl Default for ReservedName {
    fn default() -> Self {
        Self::new(RuleSettings::default().reserved_names)
    }
}

impl Rule for ReservedName {
    fn code(&self) -> &'static str {
        "S002"
    }

    // `id` inside a nested block does not collide with the resource id.
    fn descends(&self) -> bool {
        false
    }

    fn check(&self, attribute: &AttributeRecord, _enclosing: &Schema) -> Option<String> {
        self.names
            .iter()
            .any(|reserved| *reserved == attribute.name)
            .then(|| format!("{}: attribute name is reserved", attribute.name))
    }
}

/// @ai:intent Fails when ConflictsWith names an attribute absent from the whole schema
#[derive(Debug, Clone, Copy, Default)]
pub struct DanglingConflict;

impl DanglingConflict {
    /// Dotted paths such as `rule.0.port` are checked segment by segment; list
    /// indexes are skipped.
    fn exists(target: &str, names: &BTreeSet<&str>) -> bool {
        target
            .split('.')
            .filter(|segment| segment.parse::<usize>().is_err())
            .all(|segment| names.contains(segment))
    }
}

impl Rule for DanglingConflict {
    fn code(&self) -> &'static str {
        "S003"
    }

    fn check(&self, attribute: &AttributeRecord, enclosing: &Schema) -> Option<String> {
        if attribute.conflict_targets.is_empty() {
            return None;
        }
        let names = enclosing.all_names();
        let dangling: Vec<String> = attribute
            .conflict_targets
            .iter()
            .filter(|target| !Self::exists(target, &names))
            .map(|target| format!("conflict target {:?} does not exist", target))
            .collect();

        if dangling.is_empty() {
            None
        } else {
            Some(format!("{}: {}", attribute.name, dangling.join(", ")))
        }
    }
}

/// @ai:intent Ordered collection of rules applied to every attribute
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::from_settings(&RuleSettings::default())
    }
}

impl RuleSet {
    /// @ai:intent The built-in rules, with configured reserved names
    pub fn from_settings(settings: &RuleSettings) -> Self {
        Self {
            rules: vec![
                Box::new(MissingDescription),
                Box::new(ReservedName::new(settings.reserved_names.clone())),
                Box::new(DanglingConflict),
            ],
        }
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// @ai:intent Run every applicable rule on every attribute of a schema
    /// @ai:post no rule short-circuits another; nested attributes see only descending rules
    /// @ai:effects pure
    pub fn check_schema(&self, schema: &Schema, file: &Path) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.check_level(schema, schema, file, true, &mut violations);
        violations
    }

    fn check_level(
        &self,
        level: &Schema,
        root: &Schema,
        file: &Path,
        top: bool,
        violations: &mut Vec<Violation>,
    ) {
        for attribute in &level.attributes {
            for rule in &self.rules {
                if !top && !rule.descends() {
                    continue;
                }
                if let Some(message) = rule.check(attribute, root) {
                    violations.push(Violation::new(
                        rule.code(),
                        message,
                        Location::new(file.to_path_buf(), attribute.line),
                    ));
                }
            }
            if let Some(nested) = &attribute.nested {
                self.check_level(nested, root, file, false, violations);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attribute(name: &str) -> AttributeRecord {
        AttributeRecord {
            has_description: true,
            ..AttributeRecord::new(name, 1)
        }
    }

    fn schema(attributes: Vec<AttributeRecord>) -> Schema {
        Schema { attributes }
    }

    #[test]
    fn test_missing_description_ignores_value() {
        let empty = Schema::default();
        let mut described = attribute("name");
        assert_eq!(MissingDescription.check(&described, &empty), None);

        described.has_description = false;
        assert_eq!(
            MissingDescription.check(&described, &empty),
            Some("name: Missing Description attribute".to_string())
        );

        let opaque = AttributeRecord {
            inline: false,
            ..AttributeRecord::new("tags", 1)
        };
        assert_eq!(MissingDescription.check(&opaque, &empty), None);
    }

    #[test]
    fn test_reserved_name_is_case_sensitive() {
        let rule = ReservedName::default();
        let empty = Schema::default();
        assert!(rule.check(&attribute("id"), &empty).is_some());
        assert!(rule.check(&attribute("Id"), &empty).is_none());
        assert!(rule.check(&attribute("identifier"), &empty).is_none());
    }

    #[test]
    fn test_dangling_conflict() {
        let mut a = attribute("a");
        a.conflict_targets = vec!["b".to_string()];
        let root = schema(vec![a.clone(), attribute("b")]);
        assert_eq!(DanglingConflict.check(&a, &root), None);

        a.conflict_targets = vec!["c".to_string()];
        assert_eq!(
            DanglingConflict.check(&a, &root),
            Some(r#"a: conflict target "c" does not exist"#.to_string())
        );
    }

    #[test]
    fn test_dangling_conflicts_collapse_into_one_message() {
        let mut a = attribute("a");
        a.conflict_targets = vec!["c".to_string(), "d".to_string()];
        let root = schema(vec![a.clone()]);
        let violations = RuleSet::default().check_schema(&root, Path::new("w.go"));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains(r#""c""#));
        assert!(violations[0].message.contains(r#""d""#));
    }

    #[test]
    fn test_conflict_target_found_in_nested_schema() {
        let mut block = attribute("rule");
        block.nested = Some(schema(vec![attribute("port")]));
        let mut a = attribute("a");
        a.conflict_targets = vec!["port".to_string(), "rule.0.port".to_string()];
        let root = schema(vec![a.clone(), block]);
        assert_eq!(DanglingConflict.check(&a, &root), None);
    }

    #[test]
    fn test_rule_set_runs_every_rule_and_descends_selectively() {
        let mut nested_id = AttributeRecord::new("id", 9);
        nested_id.has_description = false;
        let mut block = attribute("rule");
        block.nested = Some(schema(vec![nested_id]));
        let root = schema(vec![AttributeRecord::new("id", 4), block]);

        let violations = RuleSet::default().check_schema(&root, Path::new("w.go"));
        let codes: Vec<_> = violations
            .iter()
            .map(|v| (v.code.as_str(), v.location.line))
            .collect();
        assert_eq!(codes, vec![("S001", 4), ("S002", 4), ("S001", 9)]);
    }

    struct NoHyphen;

    impl Rule for NoHyphen {
        fn code(&self) -> &'static str {
            "X001"
        }

        fn descends(&self) -> bool {
            false
        }

        fn check(&self, attribute: &AttributeRecord, _enclosing: &Schema) -> Option<String> {
            attribute
                .name
                .contains('-')
                .then(|| format!("{}: hyphen in attribute name", attribute.name))
        }
    }

    #[test]
    fn test_added_rule_runs_after_builtins() {
        let rules = RuleSet::default().with_rule(NoHyphen);
        assert_eq!(rules.len(), 4);

        let root = schema(vec![attribute("bad-name"), AttributeRecord::new("id", 3)]);
        let violations = rules.check_schema(&root, Path::new("w.go"));
        let codes: Vec<_> = violations
            .iter()
            .map(|v| (v.code.as_str(), v.location.line))
            .collect();
        assert_eq!(codes, vec![("X001", 1), ("S001", 3), ("S002", 3)]);
    }
}
