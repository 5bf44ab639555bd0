//! @ai:module:intent Resolve identifiers to same-file constant string values
//! @ai:module:layer application
//! @ai:module:public_api SymbolTable, Resolution
//! @ai:module:depends_on syntax
//! @ai:module:stateless true

use crate::syntax::{Expr, SourceUnit};
use std::collections::HashMap;

/// @ai:intent Outcome of looking an identifier up in the file scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The identifier is bound to exactly one string literal.
    Literal(String),
    /// The spec declares several values, e.g. `a, b = "x", "y"`.
    MultiValued,
    /// The initializer is not a string literal (or there is none).
    NotLiteral,
    Unknown,
}

/// @ai:intent Per-file table of const/var bindings, built once before schema extraction
#[derive(Debug, Default)]
pub struct SymbolTable {
    bindings: HashMap<String, Resolution>,
}

impl SymbolTable {
    /// @ai:intent Build the table from every value spec in the unit
    /// @ai:post the first declaration of a name wins
    /// @ai:effects pure
    pub fn build(unit: &SourceUnit) -> Self {
        let mut bindings = HashMap::new();

        for spec in &unit.value_specs {
            let resolution = match spec.values.as_slice() {
                [value] if spec.names.len() == 1 => match value.as_string() {
                    Ok(s) => Resolution::Literal(s.to_string()),
                    Err(_) => Resolution::NotLiteral,
                },
                [] => Resolution::NotLiteral,
                _ => Resolution::MultiValued,
            };
            for name in &spec.names {
                bindings
                    .entry(name.clone())
                    .or_insert_with(|| resolution.clone());
            }
        }

        Self { bindings }
    }

    /// @ai:effects pure
    pub fn lookup(&self, name: &str) -> Resolution {
        self.bindings
            .get(name)
            .cloned()
            .unwrap_or(Resolution::Unknown)
    }

    /// @ai:intent Decode an expression as a string, through one identifier hop
    /// @ai:post Err carries why the expression could not be turned into a string
    /// @ai:effects pure
    pub fn resolve_string(&self, expr: &Expr) -> Result<String, Resolution> {
        match expr {
            Expr::Identifier { name, .. } => match self.lookup(name) {
                Resolution::Literal(value) => Ok(value),
                other => Err(other),
            },
            other => other
                .as_string()
                .map(str::to_string)
                .map_err(|_| Resolution::NotLiteral),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Literal, LiteralKind, ValueSpec};
    use std::path::PathBuf;

    fn string(value: &str) -> Expr {
        Expr::Literal(Literal {
            kind: LiteralKind::String,
            value: value.to_string(),
            line: 1,
        })
    }

    fn ident(name: &str) -> Expr {
        Expr::Identifier {
            name: name.to_string(),
            line: 1,
        }
    }

    fn unit(specs: Vec<ValueSpec>) -> SourceUnit {
        SourceUnit {
            path: PathBuf::from("x.go"),
            functions: vec![],
            value_specs: specs,
            has_syntax_errors: false,
        }
    }

    fn spec(names: &[&str], values: Vec<Expr>) -> ValueSpec {
        ValueSpec {
            names: names.iter().map(|s| s.to_string()).collect(),
            values,
            line: 1,
        }
    }

    #[test]
    fn test_single_literal_resolves() {
        let table = SymbolTable::build(&unit(vec![spec(&["keyName"], vec![string("name")])]));
        assert_eq!(table.resolve_string(&ident("keyName")), Ok("name".to_string()));
    }

    #[test]
    fn test_multi_valued_spec_does_not_resolve() {
        let table = SymbolTable::build(&unit(vec![spec(
            &["a", "b"],
            vec![string("x"), string("y")],
        )]));
        assert_eq!(table.lookup("a"), Resolution::MultiValued);
        assert_eq!(table.lookup("b"), Resolution::MultiValued);
    }

    #[test]
    fn test_non_literal_and_unknown() {
        let table = SymbolTable::build(&unit(vec![spec(&["derived"], vec![ident("other")])]));
        assert_eq!(table.lookup("derived"), Resolution::NotLiteral);
        assert_eq!(
            table.resolve_string(&ident("missing")),
            Err(Resolution::Unknown)
        );
    }

    #[test]
    fn test_first_declaration_wins() {
        let table = SymbolTable::build(&unit(vec![
            spec(&["k"], vec![string("first")]),
            spec(&["k"], vec![string("second")]),
        ]));
        assert_eq!(table.lookup("k"), Resolution::Literal("first".to_string()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_literal_passes_through() {
        let table = SymbolTable::default();
        assert_eq!(table.resolve_string(&string("raw")), Ok("raw".to_string()));
    }
}
