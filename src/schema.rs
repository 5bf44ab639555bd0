//! @ai:module:intent Recover attribute schemas from resource constructor functions
//! @ai:module:layer application
//! @ai:module:public_api Constructor, is_constructor, extract_schema, extract_constructors
//! @ai:module:depends_on syntax, symbols, model, output
//! @ai:module:stateless true
//!
//! A constructor looks like
//!
//! ```go
//! func resourceWidget() *schema.Resource {
//!     return &schema.Resource{
//!         Schema: map[string]*schema.Schema{
//!             "name": {Type: schema.TypeString, Description: "..."},
//!         },
//!     }
//! }
//! ```

use crate::model::{AttributeRecord, Schema};
use crate::output::Reporter;
use crate::symbols::SymbolTable;
use crate::syntax::{CompositeLit, Element, Expr, FuncDecl, ShapeMismatch, SourceUnit};

const RESOURCE_PACKAGE: &str = "schema";
const RESOURCE_TYPE: &str = "Resource";
const SCHEMA_FIELD: &str = "Schema";
const DESCRIPTION_PROPERTY: &str = "Description";
const CONFLICTS_PROPERTY: &str = "ConflictsWith";
const ELEM_PROPERTY: &str = "Elem";

/// @ai:intent A constructor function together with the schema it declares
#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: String,
    pub line: usize,
    pub schema: Schema,
}

/// @ai:intent Check the constructor signature: exactly one `*schema.Resource` result
/// @ai:effects pure
pub fn is_constructor(func: &FuncDecl) -> bool {
    func.returns_pointer_to(RESOURCE_PACKAGE, RESOURCE_TYPE)
}

/// @ai:intent Extract the attribute schema a constructor returns
/// @ai:pre is_constructor(func)
/// @ai:post Err when the body does not start with `return &schema.Resource{Schema: ...}`
/// @ai:effects pure
pub fn extract_schema(
    func: &FuncDecl,
    symbols: &SymbolTable,
    reporter: &mut Reporter<'_>,
) -> Result<Schema, ShapeMismatch> {
    let resource = func
        .leading_return()?
        .single()?
        .as_composite()?;
    let field = resource.field(SCHEMA_FIELD).ok_or_else(|| {
        ShapeMismatch::new("Schema field", "resource literal without one", resource.line)
    })?;
    let map = field.value.as_composite()?;
    Ok(schema_from_map(map, symbols, reporter))
}

/// @ai:intent Extract every constructor in a file; other functions become debug notes
/// @ai:effects pure
pub fn extract_constructors(
    unit: &SourceUnit,
    symbols: &SymbolTable,
    reporter: &mut Reporter<'_>,
) -> Vec<Constructor> {
    let mut constructors = Vec::new();

    for func in &unit.functions {
        if !is_constructor(func) {
            reporter.note(format_args!(
                "{}: ignoring {} because it does not return *schema.Resource",
                unit.path.display(),
                func.name
            ));
            continue;
        }
        match extract_schema(func, symbols, reporter) {
            Ok(schema) => constructors.push(Constructor {
                name: func.name.clone(),
                line: func.line,
                schema,
            }),
            Err(mismatch) => reporter.note(format_args!(
                "{}: structure of {} does not allow parsing: {}",
                unit.path.display(),
                func.name,
                mismatch
            )),
        }
    }

    constructors
}

fn schema_from_map(
    map: &CompositeLit,
    symbols: &SymbolTable,
    reporter: &mut Reporter<'_>,
) -> Schema {
    let mut schema = Schema::default();

    for element in &map.elements {
        let kv = match element {
            Element::KeyValue(kv) => kv,
            Element::Value(value) => {
                reporter.note(format_args!(
                    "line {}: ignoring schema element without a key",
                    value.line()
                ));
                continue;
            }
        };

        let name = match symbols.resolve_string(&kv.key) {
            Ok(name) => name,
            Err(resolution) => {
                reporter.note(format_args!(
                    "line {}: skipping attribute with unresolved key {} ({:?})",
                    kv.line,
                    kv.key.kind(),
                    resolution
                ));
                continue;
            }
        };

        let record = match kv.value.as_composite() {
            Ok(definition) => attribute_from_literal(name, kv.line, definition, symbols, reporter),
            Err(_) => AttributeRecord {
                inline: false,
                ..AttributeRecord::new(name, kv.line)
            },
        };
        schema.attributes.push(record);
    }

    schema
}

fn attribute_from_literal(
    name: String,
    line: usize,
    definition: &CompositeLit,
    symbols: &SymbolTable,
    reporter: &mut Reporter<'_>,
) -> AttributeRecord {
    let mut record = AttributeRecord::new(name, line);

    for property in definition.keyed() {
        let Ok(key) = property.key.as_identifier() else {
            continue;
        };
        match key {
            DESCRIPTION_PROPERTY => record.has_description = true,
            CONFLICTS_PROPERTY => {
                record.conflict_targets = conflict_targets(property.value.deref(), symbols, reporter);
            }
            ELEM_PROPERTY => {
                record.nested = nested_schema(&property.value, symbols, reporter);
            }
            _ => {}
        }
    }

    record
}

fn conflict_targets(
    value: &Expr,
    symbols: &SymbolTable,
    reporter: &mut Reporter<'_>,
) -> Vec<String> {
    let Ok(list) = value.as_composite() else {
        reporter.note(format_args!(
            "line {}: ConflictsWith is a {}, not a list literal",
            value.line(),
            value.kind()
        ));
        return Vec::new();
    };

    let mut targets = Vec::new();
    for element in &list.elements {
        let Element::Value(expr) = element else {
            continue;
        };
        match symbols.resolve_string(expr) {
            Ok(target) => targets.push(target),
            Err(resolution) => reporter.note(format_args!(
                "line {}: skipping unresolved conflict target ({:?})",
                expr.line(),
                resolution
            )),
        }
    }
    targets
}

/// `Elem: &schema.Resource{Schema: ...}` declares a nested block; any other Elem does not.
fn nested_schema(
    value: &Expr,
    symbols: &SymbolTable,
    reporter: &mut Reporter<'_>,
) -> Option<Schema> {
    let resource = value.as_composite().ok()?;
    if !resource.is_type(RESOURCE_TYPE) {
        return None;
    }
    let map = resource.field(SCHEMA_FIELD)?.value.as_composite().ok()?;
    Some(schema_from_map(map, symbols, reporter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::parser::GoParser;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn constructors(source: &str) -> Vec<Constructor> {
        let unit = GoParser::new()
            .unwrap()
            .parse(Path::new("resource_widget.go"), source.as_bytes())
            .unwrap();
        let symbols = SymbolTable::build(&unit);
        let mut sink = MemorySink::default();
        let mut reporter = Reporter::new(&mut sink, false);
        extract_constructors(&unit, &symbols, &mut reporter)
    }

    #[test]
    fn test_extracts_ordered_attributes() {
        let found = constructors(
            r#"package acme

func resourceWidget() *schema.Resource {
	return &schema.Resource{
		Create: resourceWidgetCreate,
		Schema: map[string]*schema.Schema{
			"name": {
				Type:     schema.TypeString,
				Required: true,
			},
			"size": &schema.Schema{
				Type:          schema.TypeInt,
				Description:   "",
				ConflictsWith: []string{"name"},
			},
			"tags": tagsSchema(),
		},
	}
}
"#,
        );

        assert_eq!(found.len(), 1);
        let constructor = &found[0];
        assert_eq!(constructor.name, "resourceWidget");
        assert_eq!(constructor.line, 3);

        let attributes = &constructor.schema.attributes;
        let names: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name", "size", "tags"]);
        assert_eq!(attributes[0].line, 7);
        assert!(!attributes[0].has_description);
        assert!(attributes[1].has_description);
        assert_eq!(attributes[1].conflict_targets, vec!["name".to_string()]);
        assert!(!attributes[2].inline);
    }

    #[test]
    fn test_resolves_constant_keys_and_skips_unresolved() {
        let found = constructors(
            r#"package acme

const keyName = "name"
const keyA, keyB = "a", "b"
var keyDerived = prefix + "x"

func resourceWidget() *schema.Resource {
	return &schema.Resource{
		Schema: map[string]*schema.Schema{
			keyName:    {Type: schema.TypeString, Description: "The name."},
			keyA:       {Type: schema.TypeString},
			keyDerived: {Type: schema.TypeString},
			keyMissing: {Type: schema.TypeString},
		},
	}
}
"#,
        );

        let names: Vec<_> = found[0]
            .schema
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["name"]);
    }

    #[test]
    fn test_nested_block_schema() {
        let found = constructors(
            r#"package acme

func resourceWidget() *schema.Resource {
	return &schema.Resource{
		Schema: map[string]*schema.Schema{
			"rule": {
				Type: schema.TypeList,
				Elem: &schema.Resource{
					Schema: map[string]*schema.Schema{
						"port": {Type: schema.TypeInt},
					},
				},
			},
			"labels": {
				Type: schema.TypeList,
				Elem: &schema.Schema{Type: schema.TypeString},
			},
		},
	}
}
"#,
        );

        let attributes = &found[0].schema.attributes;
        let nested = attributes[0].nested.as_ref().unwrap();
        assert_eq!(nested.attributes[0].name, "port");
        assert!(attributes[1].nested.is_none());
    }

    #[test]
    fn test_non_constructors_and_unparsable_bodies_are_skipped() {
        let found = constructors(
            r#"package acme

func helper() string {
	return "x"
}

func resourceFactory() (*schema.Resource, error) {
	return nil, nil
}

func resourceIndirect() *schema.Resource {
	r := &schema.Resource{}
	return r
}

func otherPackage() *other.Resource {
	return &other.Resource{Schema: map[string]*schema.Schema{}}
}
"#,
        );

        assert!(found.is_empty());
    }
}
