//! @ai:module:intent Extract the provider catalog from the registration function
//! @ai:module:layer application
//! @ai:module:public_api Catalog, CatalogEntry, extract_catalog, load_catalog
//! @ai:module:depends_on syntax, parser, output, error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::model::EntityKind;
use crate::output::Reporter;
use crate::parser::GoParser;
use crate::syntax::{ShapeMismatch, SourceUnit};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const REGISTRATION_FILE: &str = "provider.go";
pub const REGISTRATION_FUNCTION: &str = "Provider";
const RESOURCES_FIELD: &str = "ResourcesMap";
const DATASOURCES_FIELD: &str = "DataSourcesMap";

/// @ai:intent One registered entity and the function that builds its schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub declared_name: String,
    pub constructor_name: String,
    pub kind: EntityKind,
    pub line: usize,
}

/// @ai:intent Registered entities, partitioned by kind, in declaration order
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub resources: Vec<CatalogEntry>,
    pub datasources: Vec<CatalogEntry>,
}

impl Catalog {
    /// @ai:intent Iterate resources first, then datasources
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.resources.iter().chain(self.datasources.iter())
    }

    /// @ai:intent Every entry built by the named constructor
    /// @ai:post one constructor may back several declared names
    pub fn by_constructor(&self, constructor: &str) -> Vec<&CatalogEntry> {
        self.entries()
            .filter(|entry| entry.constructor_name == constructor)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len() + self.datasources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, entry: CatalogEntry) {
        match entry.kind {
            EntityKind::Resource => self.resources.push(entry),
            EntityKind::Datasource => self.datasources.push(entry),
        }
    }
}

/// @ai:intent Parse `<provider>/provider.go` and extract its catalog
/// @ai:effects fs:read
pub fn load_catalog(
    parser: &mut GoParser,
    provider_path: &Path,
    reporter: &mut Reporter<'_>,
) -> Result<Catalog> {
    let unit = parser.parse_file(&provider_path.join(REGISTRATION_FILE))?;
    extract_catalog(&unit, reporter)
}

/// @ai:intent Walk the registration function's returned literal for both catalog maps
/// @ai:pre unit is the file declaring the registration function
/// @ai:post any deviation from the expected shape is fatal
/// @ai:effects pure
pub fn extract_catalog(unit: &SourceUnit, reporter: &mut Reporter<'_>) -> Result<Catalog> {
    let fatal = |mismatch: ShapeMismatch| Error::Registration {
        file: unit.path.clone(),
        line: mismatch.line,
        message: mismatch.to_string(),
    };

    let function = unit
        .functions
        .iter()
        .find(|f| f.name == REGISTRATION_FUNCTION)
        .ok_or_else(|| Error::Registration {
            file: unit.path.clone(),
            line: 1,
            message: format!("function {} not found", REGISTRATION_FUNCTION),
        })?;

    let provider = function
        .first_return()
        .and_then(|ret| ret.single())
        .and_then(|expr| expr.as_composite())
        .map_err(fatal)?;

    let mut catalog = Catalog::default();
    let mut seen = HashSet::new();

    for field in provider.keyed() {
        let field_name = field.key.as_identifier().map_err(fatal)?;
        let kind = match field_name {
            RESOURCES_FIELD => EntityKind::Resource,
            DATASOURCES_FIELD => EntityKind::Datasource,
            other => {
                reporter.note(format_args!("ignoring provider field {:?}", other));
                continue;
            }
        };

        let map = field.value.as_composite().map_err(fatal)?;
        if map.keyed().count() != map.elements.len() {
            return Err(Error::Registration {
                file: unit.path.clone(),
                line: map.line,
                message: format!("{} has an element without a key", field_name),
            });
        }

        for element in map.keyed() {
            let declared_name = element.key.as_string().map_err(fatal)?;
            let constructor = element
                .value
                .as_call()
                .and_then(|call| call.callee_name())
                .map_err(fatal)?;

            if !seen.insert((kind, declared_name.to_string())) {
                return Err(Error::DuplicateEntry {
                    file: unit.path.clone(),
                    line: element.line,
                    kind: kind.to_string(),
                    name: declared_name.to_string(),
                });
            }

            catalog.push(CatalogEntry {
                declared_name: declared_name.to_string(),
                constructor_name: constructor.to_string(),
                kind,
                line: element.line,
            });
        }
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> Result<Catalog> {
        let unit = GoParser::new()
            .unwrap()
            .parse(Path::new("provider.go"), source.as_bytes())
            .unwrap();
        let mut sink = MemorySink::default();
        let mut reporter = Reporter::new(&mut sink, false);
        extract_catalog(&unit, &mut reporter)
    }

    #[test]
    fn test_extracts_both_maps_in_order() {
        let catalog = extract(
            r#"package acme

func Provider() terraform.ResourceProvider {
	return &schema.Provider{
		Schema: map[string]*schema.Schema{},
		DataSourcesMap: map[string]*schema.Resource{
			"acme_region": dataSourceRegion(),
		},
		ResourcesMap: map[string]*schema.Resource{
			"acme_widget": resourceWidget(),
			"acme_gadget": resourceGadget(),
			"acme_sprocket": resourceSprocket(),
		},
	}
}
"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 4);
        let resources: Vec<_> = catalog
            .resources
            .iter()
            .map(|e| (e.declared_name.as_str(), e.constructor_name.as_str()))
            .collect();
        assert_eq!(
            resources,
            vec![
                ("acme_widget", "resourceWidget"),
                ("acme_gadget", "resourceGadget"),
                ("acme_sprocket", "resourceSprocket"),
            ]
        );
        assert_eq!(catalog.datasources.len(), 1);
        assert_eq!(catalog.datasources[0].kind, EntityKind::Datasource);
        assert_eq!(catalog.datasources[0].line, 7);
    }

    #[test]
    fn test_non_call_value_is_fatal() {
        let err = extract(
            r#"package acme

func Provider() *schema.Provider {
	return &schema.Provider{
		ResourcesMap: map[string]*schema.Resource{
			"acme_widget": widgetResource,
		},
	}
}
"#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Registration { line: 6, .. }));
    }

    #[test]
    fn test_multi_value_return_is_fatal() {
        let err = extract(
            r#"package acme

func Provider() (*schema.Provider, error) {
	return &schema.Provider{}, nil
}
"#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Registration { .. }));
    }

    #[test]
    fn test_missing_registration_function_is_fatal() {
        let err = extract("package acme\n\nfunc other() {}\n").unwrap_err();
        assert!(err.to_string().contains("function Provider not found"));
    }

    #[test]
    fn test_duplicate_declared_name_is_fatal() {
        let err = extract(
            r#"package acme

func Provider() *schema.Provider {
	return &schema.Provider{
		ResourcesMap: map[string]*schema.Resource{
			"acme_widget": resourceWidget(),
			"acme_widget": resourceWidgetV2(),
		},
	}
}
"#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::DuplicateEntry { ref name, .. } if name == "acme_widget"));
    }

    #[test]
    fn test_by_constructor_finds_aliases() {
        let catalog = extract(
            r#"package acme

func Provider() *schema.Provider {
	return &schema.Provider{
		ResourcesMap: map[string]*schema.Resource{
			"acme_widget":        resourceWidget(),
			"acme_widget_legacy": resourceWidget(),
		},
	}
}
"#,
        )
        .unwrap();

        assert_eq!(catalog.by_constructor("resourceWidget").len(), 2);
        assert!(catalog.by_constructor("resourceGadget").is_empty());
    }
}
