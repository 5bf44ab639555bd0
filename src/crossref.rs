//! @ai:module:intent Verify every catalog entry's attributes appear in its documentation
//! @ai:module:layer application
//! @ai:module:public_api expected_markup, check_entry, check_unbound_entry
//! @ai:module:depends_on catalog, docs, schema, model
//! @ai:module:stateless true

use crate::catalog::CatalogEntry;
use crate::docs::DocIndex;
use crate::model::{Location, Violation};
use crate::schema::Constructor;
use std::path::Path;

/// @ai:intent Markup an attribute must appear as in its fragment
/// @ai:example ("name") -> "`name`"
/// @ai:effects pure
pub fn expected_markup(attribute: &str) -> String {
    format!("`{}`", attribute)
}

/// @ai:intent Cross-reference one catalog entry against the documentation index
/// @ai:post no fragment: exactly one D002 and no attribute-level violations
/// @ai:effects pure
pub fn check_entry(
    entry: &CatalogEntry,
    constructor: &Constructor,
    docs: &DocIndex,
    file: &Path,
) -> Vec<Violation> {
    let Some(doc) = docs.get(entry.kind, &entry.declared_name) else {
        return vec![not_found(
            entry,
            Location::new(file.to_path_buf(), constructor.line),
        )];
    };

    constructor
        .schema
        .attributes
        .iter()
        .filter_map(|attribute| {
            let markup = expected_markup(&attribute.name);
            if doc.contains(&markup) {
                return None;
            }
            Some(Violation::new(
                "D001",
                format!("missing {:?} in docs of {:?}", markup, entry.declared_name),
                Location::new(file.to_path_buf(), attribute.line),
            ))
        })
        .collect()
}

/// @ai:intent Documentation check for an entry whose constructor schema was never extracted
/// @ai:post Some(D002) at the registration line when no fragment matches, otherwise None
/// @ai:effects pure
pub fn check_unbound_entry(
    entry: &CatalogEntry,
    docs: &DocIndex,
    registration_file: &Path,
) -> Option<Violation> {
    if docs.get(entry.kind, &entry.declared_name).is_some() {
        return None;
    }
    Some(not_found(
        entry,
        Location::new(registration_file.to_path_buf(), entry.line),
    ))
}

fn not_found(entry: &CatalogEntry, location: Location) -> Violation {
    Violation::new(
        "D002",
        format!(
            "documentation for {} {:?} not found",
            entry.kind, entry.declared_name
        ),
        location,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{Classifier, DocFragment};
    use crate::model::{AttributeRecord, EntityKind, Schema};
    use crate::output::{MemorySink, Reporter};
    use std::path::PathBuf;

    fn index(fragments: Vec<(&str, &str)>) -> DocIndex {
        let mut sink = MemorySink::default();
        let mut reporter = Reporter::new(&mut sink, false);
        DocIndex::build(
            &Classifier::new("acme"),
            fragments.into_iter().map(|(path, content)| DocFragment {
                path: PathBuf::from(path),
                content: content.as_bytes().to_vec(),
            }),
            &mut reporter,
        )
    }

    fn entry(name: &str, constructor: &str, kind: EntityKind) -> CatalogEntry {
        CatalogEntry {
            declared_name: name.to_string(),
            constructor_name: constructor.to_string(),
            kind,
            line: 1,
        }
    }

    fn constructor(name: &str, attributes: &[(&str, usize)]) -> Constructor {
        Constructor {
            name: name.to_string(),
            line: 10,
            schema: Schema {
                attributes: attributes
                    .iter()
                    .map(|(n, line)| AttributeRecord::new(*n, *line))
                    .collect(),
            },
        }
    }

    #[test]
    fn test_missing_attribute_markup() {
        let docs = index(vec![(
            "website/docs/r/widget.html.markdown",
            "---\nsidebar_current: \"docs-acme-resource-widget\"\n---\n\n* `name` - The name.\n* id - not marked up\n",
        )]);
        let violations = check_entry(
            &entry("acme_widget", "resourceWidget", EntityKind::Resource),
            &constructor("resourceWidget", &[("name", 12), ("id", 16)]),
            &docs,
            Path::new("resource_widget.go"),
        );

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "D001");
        assert_eq!(violations[0].location.line, 16);
        assert_eq!(
            violations[0].message,
            r#"missing "`id`" in docs of "acme_widget""#
        );
    }

    #[test]
    fn test_fragment_not_found_replaces_attribute_checks() {
        let docs = index(vec![(
            "website/docs/r/widget.html.markdown",
            "sidebar_current: \"docs-acme-resource-widget\"\n",
        )]);
        let violations = check_entry(
            &entry("acme_region", "dataSourceRegion", EntityKind::Datasource),
            &constructor("dataSourceRegion", &[("name", 3), ("zone", 4)]),
            &docs,
            Path::new("data_source_region.go"),
        );

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "D002");
        assert_eq!(violations[0].location.line, 10);
    }

    #[test]
    fn test_kind_must_match() {
        let docs = index(vec![(
            "website/docs/r/region.html.markdown",
            "sidebar_current: \"docs-acme-resource-region\"\n`name`\n",
        )]);
        let violations = check_entry(
            &entry("acme_region", "dataSourceRegion", EntityKind::Datasource),
            &constructor("dataSourceRegion", &[("name", 3)]),
            &docs,
            Path::new("data_source_region.go"),
        );
        assert_eq!(violations[0].code, "D002");
    }

    #[test]
    fn test_unbound_entry_reports_at_registration_line() {
        let docs = index(vec![(
            "website/docs/r/widget.html.markdown",
            "sidebar_current: \"docs-acme-resource-widget\"\n",
        )]);
        let mut region = entry("acme_region", "dataSourceRegion", EntityKind::Datasource);
        region.line = 11;

        let violation = check_unbound_entry(&region, &docs, Path::new("provider.go")).unwrap();
        assert_eq!(violation.code, "D002");
        assert_eq!(violation.location.file, PathBuf::from("provider.go"));
        assert_eq!(violation.location.line, 11);

        let widget = entry("acme_widget", "resourceWidget", EntityKind::Resource);
        assert!(check_unbound_entry(&widget, &docs, Path::new("provider.go")).is_none());
    }
}
