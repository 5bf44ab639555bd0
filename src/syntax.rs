//! @ai:module:intent Closed syntax model for the Go constructs the audit inspects
//! @ai:module:layer domain
//! @ai:module:public_api SourceUnit, FuncDecl, Stmt, Expr, Element, KeyValue, CompositeLit, TypeRef, ValueSpec, ShapeMismatch
//! @ai:module:stateless true
//!
//! Anything the extractors never look at lowers to an `Other` variant carrying the
//! grammar node kind, so every match over these types is exhaustive.

use std::fmt;
use std::path::PathBuf;

/// @ai:intent One parsed Go file, immutable once lowered
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub functions: Vec<FuncDecl>,
    /// Every `const`/`var` spec in the file, top level and function local.
    pub value_specs: Vec<ValueSpec>,
    pub has_syntax_errors: bool,
}

/// @ai:intent A top-level function declaration (methods are not lowered)
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub results: Vec<TypeRef>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Return(ReturnStmt),
    Other { kind: String, line: usize },
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
    pub line: usize,
}

/// @ai:intent A type expression, reduced to the shapes constructor detection needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Pointer(Box<TypeRef>),
    Qualified { package: String, name: String },
    Named(String),
    Other(String),
}

/// @ai:intent A `const` or `var` spec: `a, b = x, y`
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub values: Vec<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Bool,
    Nil,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Decoded value; for strings the quotes and escapes are already removed.
    pub value: String,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub function: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub line: usize,
}

/// @ai:intent A composite literal; `type_name` is None when the type is elided
#[derive(Debug, Clone)]
pub struct CompositeLit {
    pub type_name: Option<String>,
    pub elements: Vec<Element>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub enum Element {
    KeyValue(KeyValue),
    Value(Expr),
}

#[derive(Debug, Clone)]
pub struct KeyValue {
    pub key: Expr,
    pub value: Expr,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Identifier { name: String, line: usize },
    Selector {
        operand: Box<Expr>,
        field: String,
        line: usize,
    },
    Call(CallExpr),
    Composite(CompositeLit),
    Unary {
        operator: String,
        operand: Box<Expr>,
        line: usize,
    },
    Other { kind: String, line: usize },
}

/// @ai:intent A node did not have the shape an extractor required
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected: &'static str,
    pub found: String,
    pub line: usize,
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: expected {}, found {}",
            self.line, self.expected, self.found
        )
    }
}

impl std::error::Error for ShapeMismatch {}

impl ShapeMismatch {
    pub fn new(expected: &'static str, found: impl Into<String>, line: usize) -> Self {
        Self {
            expected,
            found: found.into(),
            line,
        }
    }
}

impl Expr {
    /// @ai:intent Name of the variant, used in shape mismatch reports
    /// @ai:effects pure
    pub fn kind(&self) -> &str {
        match self {
            Expr::Literal(lit) => match lit.kind {
                LiteralKind::String => "string literal",
                LiteralKind::Number => "number literal",
                LiteralKind::Bool => "bool literal",
                LiteralKind::Nil => "nil",
            },
            Expr::Identifier { .. } => "identifier",
            Expr::Selector { .. } => "selector expression",
            Expr::Call(_) => "call expression",
            Expr::Composite(_) => "composite literal",
            Expr::Unary { .. } => "unary expression",
            Expr::Other { kind, .. } => kind,
        }
    }

    /// @ai:effects pure
    pub fn line(&self) -> usize {
        match self {
            Expr::Literal(lit) => lit.line,
            Expr::Identifier { line, .. }
            | Expr::Selector { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Other { line, .. } => *line,
            Expr::Call(call) => call.line,
            Expr::Composite(lit) => lit.line,
        }
    }

    fn mismatch(&self, expected: &'static str) -> ShapeMismatch {
        ShapeMismatch::new(expected, self.kind(), self.line())
    }

    /// @ai:intent Strip a leading `&` so `&T{...}` and `T{...}` read the same
    /// @ai:effects pure
    pub fn deref(&self) -> &Expr {
        match self {
            Expr::Unary {
                operator, operand, ..
            } if operator == "&" => operand,
            other => other,
        }
    }

    /// @ai:intent View this expression as a composite literal, looking through `&`
    /// @ai:effects pure
    pub fn as_composite(&self) -> Result<&CompositeLit, ShapeMismatch> {
        match self.deref() {
            Expr::Composite(lit) => Ok(lit),
            other => Err(other.mismatch("composite literal")),
        }
    }

    /// @ai:effects pure
    pub fn as_call(&self) -> Result<&CallExpr, ShapeMismatch> {
        match self {
            Expr::Call(call) => Ok(call),
            other => Err(other.mismatch("call expression")),
        }
    }

    /// @ai:effects pure
    pub fn as_identifier(&self) -> Result<&str, ShapeMismatch> {
        match self {
            Expr::Identifier { name, .. } => Ok(name),
            other => Err(other.mismatch("identifier")),
        }
    }

    /// @ai:intent View this expression as a decoded string literal
    /// @ai:effects pure
    pub fn as_string(&self) -> Result<&str, ShapeMismatch> {
        match self {
            Expr::Literal(Literal {
                kind: LiteralKind::String,
                value,
                ..
            }) => Ok(value),
            other => Err(other.mismatch("string literal")),
        }
    }
}

impl CallExpr {
    /// @ai:intent Name of the invoked function; only plain identifiers qualify
    /// @ai:effects pure
    pub fn callee_name(&self) -> Result<&str, ShapeMismatch> {
        self.function.as_identifier()
    }
}

impl CompositeLit {
    /// @ai:intent Iterate the keyed elements, skipping positional ones
    /// @ai:effects pure
    pub fn keyed(&self) -> impl Iterator<Item = &KeyValue> {
        self.elements.iter().filter_map(|element| match element {
            Element::KeyValue(kv) => Some(kv),
            Element::Value(_) => None,
        })
    }

    /// @ai:intent Find the value of a struct field written as `Name: value`
    /// @ai:effects pure
    pub fn field(&self, name: &str) -> Option<&KeyValue> {
        self.keyed()
            .find(|kv| matches!(&kv.key, Expr::Identifier { name: key, .. } if key == name))
    }

    /// @ai:intent Check whether the literal's type ends with the given type name
    /// @ai:example (type "schema.Resource", "Resource") -> true
    /// @ai:effects pure
    pub fn is_type(&self, name: &str) -> bool {
        self.type_name
            .as_deref()
            .map(|t| t.rsplit('.').next() == Some(name))
            .unwrap_or(false)
    }
}

impl FuncDecl {
    /// @ai:intent The first statement of the body, if it is a return statement
    /// @ai:effects pure
    pub fn leading_return(&self) -> Result<&ReturnStmt, ShapeMismatch> {
        match self.body.first() {
            Some(Stmt::Return(ret)) => Ok(ret),
            Some(Stmt::Other { kind, line }) => {
                Err(ShapeMismatch::new("return statement", kind.as_str(), *line))
            }
            None => Err(ShapeMismatch::new("return statement", "empty body", self.line)),
        }
    }

    /// @ai:intent The first return statement at the top level of the body
    /// @ai:effects pure
    pub fn first_return(&self) -> Result<&ReturnStmt, ShapeMismatch> {
        self.body
            .iter()
            .find_map(|stmt| match stmt {
                Stmt::Return(ret) => Some(ret),
                Stmt::Other { .. } => None,
            })
            .ok_or_else(|| ShapeMismatch::new("return statement", "none", self.line))
    }

    /// @ai:intent Check for exactly one result of type `*package.name`
    /// @ai:effects pure
    pub fn returns_pointer_to(&self, package: &str, name: &str) -> bool {
        match self.results.as_slice() {
            [TypeRef::Pointer(inner)] => matches!(
                inner.as_ref(),
                TypeRef::Qualified { package: p, name: n } if p == package && n == name
            ),
            _ => false,
        }
    }
}

impl ReturnStmt {
    /// @ai:intent The single returned expression; multi-value returns mismatch
    /// @ai:effects pure
    pub fn single(&self) -> Result<&Expr, ShapeMismatch> {
        match self.results.as_slice() {
            [only] => Ok(only),
            [] => Err(ShapeMismatch::new("one return value", "bare return", self.line)),
            many => Err(ShapeMismatch::new(
                "one return value",
                format!("{} return values", many.len()),
                self.line,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Identifier {
            name: name.to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_as_composite_looks_through_address_of() {
        let lit = Expr::Unary {
            operator: "&".to_string(),
            operand: Box::new(Expr::Composite(CompositeLit {
                type_name: Some("schema.Resource".to_string()),
                elements: vec![],
                line: 3,
            })),
            line: 3,
        };

        let composite = lit.as_composite().unwrap();
        assert!(composite.is_type("Resource"));
        assert!(!composite.is_type("Schema"));
    }

    #[test]
    fn test_mismatch_names_found_kind() {
        let err = ident("x").as_call().unwrap_err();
        assert_eq!(err.expected, "call expression");
        assert_eq!(err.found, "identifier");
    }

    #[test]
    fn test_multi_value_return_is_mismatch() {
        let ret = ReturnStmt {
            results: vec![ident("a"), ident("b")],
            line: 7,
        };
        let err = ret.single().unwrap_err();
        assert_eq!(err.found, "2 return values");
        assert_eq!(err.line, 7);
    }

    #[test]
    fn test_returns_pointer_to() {
        let func = FuncDecl {
            name: "resourceWidget".to_string(),
            results: vec![TypeRef::Pointer(Box::new(TypeRef::Qualified {
                package: "schema".to_string(),
                name: "Resource".to_string(),
            }))],
            body: vec![],
            line: 1,
        };
        assert!(func.returns_pointer_to("schema", "Resource"));
        assert!(!func.returns_pointer_to("schema", "Provider"));
    }
}
