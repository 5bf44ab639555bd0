//! @ai:module:intent Define the data model shared by extractors, rules and the reporter
//! @ai:module:layer domain
//! @ai:module:public_api Location, EntityKind, AttributeRecord, Schema, Violation
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// @ai:intent Represents a source code location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
}

impl Location {
    /// @ai:intent Create a new Location
    pub fn new(file: PathBuf, line: usize) -> Self {
        Self { file, line }
    }
}

/// @ai:intent The two kinds of entity a provider registers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Resource,
    Datasource,
}

impl EntityKind {
    /// @ai:effects pure
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Resource => "resource",
            EntityKind::Datasource => "datasource",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// @ai:intent One attribute of an entity schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeRecord {
    pub name: String,
    pub line: usize,
    /// False when the definition is not a literal, e.g. `"tags": tagsSchema()`.
    pub inline: bool,
    pub has_description: bool,
    pub conflict_targets: Vec<String>,
    pub nested: Option<Schema>,
}

impl AttributeRecord {
    /// @ai:intent Create a record for an inline definition with no properties yet
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            inline: true,
            has_description: false,
            conflict_targets: Vec::new(),
            nested: None,
        }
    }
}

/// @ai:intent Ordered attribute records of one schema literal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Schema {
    pub attributes: Vec<AttributeRecord>,
}

impl Schema {
    /// @ai:intent Collect every attribute name in this schema and all nested schemas
    /// @ai:effects pure
    pub fn all_names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        for attribute in &self.attributes {
            names.insert(attribute.name.as_str());
            if let Some(nested) = &attribute.nested {
                nested.collect_names(names);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// @ai:intent A substantive rule or documentation failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub code: String,
    pub message: String,
    pub location: Location,
}

impl Violation {
    pub fn new(code: &str, message: impl Into<String>, location: Location) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            location,
        }
    }
}
