//! @ai:module:intent Parse Go source with tree-sitter and lower it into the syntax model
//! @ai:module:layer application
//! @ai:module:public_api GoParser
//! @ai:module:depends_on syntax, error
//! @ai:module:stateless false

use crate::error::{Error, Result};
use crate::syntax::{
    CallExpr, CompositeLit, Element, Expr, FuncDecl, KeyValue, Literal, LiteralKind, ReturnStmt,
    SourceUnit, Stmt, TypeRef, ValueSpec,
};
use std::path::Path;
use tree_sitter::{Node, Parser};

/// @ai:intent Reusable Go parser; one instance serves a whole run
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// @ai:intent Create a parser with the Go grammar loaded
    /// @ai:effects pure
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// @ai:intent Parse source bytes and lower them into a SourceUnit
    /// @ai:post syntax errors do not fail; they set has_syntax_errors
    /// @ai:effects pure
    pub fn parse(&mut self, path: &Path, source: &[u8]) -> Result<SourceUnit> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::Unparsable(path.to_path_buf()))?;
        let root = tree.root_node();
        let lower = Lowering { source };

        let mut functions = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() == "function_declaration" {
                functions.push(lower.function(child));
            }
        }

        let mut value_specs = Vec::new();
        lower.collect_value_specs(root, &mut value_specs);

        Ok(SourceUnit {
            path: path.to_path_buf(),
            functions,
            value_specs,
            has_syntax_errors: root.has_error(),
        })
    }

    /// @ai:intent Read and parse a file from disk
    /// @ai:effects fs:read
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceUnit> {
        let source = std::fs::read(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse(path, &source)
    }
}

struct Lowering<'a> {
    source: &'a [u8],
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// Named children minus comments, which the grammar allows almost anywhere.
fn significant_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    children
}

impl<'a> Lowering<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn function(&self, node: Node) -> FuncDecl {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let results = node
            .child_by_field_name("result")
            .map(|n| self.results(n))
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .map(|n| self.block(n))
            .unwrap_or_default();

        FuncDecl {
            name,
            results,
            body,
            line: line_of(node),
        }
    }

    fn results(&self, node: Node) -> Vec<TypeRef> {
        if node.kind() != "parameter_list" {
            return vec![self.type_ref(node)];
        }

        let mut results = Vec::new();
        for decl in significant_children(node) {
            let Some(ty) = decl.child_by_field_name("type") else {
                continue;
            };
            let mut cursor = decl.walk();
            let names = decl.children_by_field_name("name", &mut cursor).count();
            for _ in 0..names.max(1) {
                results.push(self.type_ref(ty));
            }
        }
        results
    }

    fn type_ref(&self, node: Node) -> TypeRef {
        match node.kind() {
            "pointer_type" => match significant_children(node).first() {
                Some(inner) => TypeRef::Pointer(Box::new(self.type_ref(*inner))),
                None => TypeRef::Other(self.text(node).to_string()),
            },
            "qualified_type" => {
                let package = node.child_by_field_name("package");
                let name = node.child_by_field_name("name");
                match (package, name) {
                    (Some(package), Some(name)) => TypeRef::Qualified {
                        package: self.text(package).to_string(),
                        name: self.text(name).to_string(),
                    },
                    _ => TypeRef::Other(self.text(node).to_string()),
                }
            }
            "type_identifier" => TypeRef::Named(self.text(node).to_string()),
            "parenthesized_type" => match significant_children(node).first() {
                Some(inner) => self.type_ref(*inner),
                None => TypeRef::Other(self.text(node).to_string()),
            },
            _ => TypeRef::Other(self.text(node).to_string()),
        }
    }

    fn block(&self, node: Node) -> Vec<Stmt> {
        let mut statements = Vec::new();
        for child in significant_children(node) {
            // Newer grammars wrap the statements in a statement_list node.
            if child.kind() == "statement_list" {
                for stmt in significant_children(child) {
                    statements.push(self.statement(stmt));
                }
            } else {
                statements.push(self.statement(child));
            }
        }
        statements
    }

    fn statement(&self, node: Node) -> Stmt {
        match node.kind() {
            "return_statement" => Stmt::Return(ReturnStmt {
                results: significant_children(node)
                    .into_iter()
                    .flat_map(|child| self.expression_list(child))
                    .collect(),
                line: line_of(node),
            }),
            kind => Stmt::Other {
                kind: kind.to_string(),
                line: line_of(node),
            },
        }
    }

    fn expression_list(&self, node: Node) -> Vec<Expr> {
        if node.kind() == "expression_list" {
            significant_children(node)
                .into_iter()
                .map(|child| self.expr(child))
                .collect()
        } else {
            vec![self.expr(node)]
        }
    }

    fn expr(&self, node: Node) -> Expr {
        let line = line_of(node);
        match node.kind() {
            "interpreted_string_literal" => Expr::Literal(Literal {
                kind: LiteralKind::String,
                value: decode_interpreted(self.text(node)),
                line,
            }),
            "raw_string_literal" => Expr::Literal(Literal {
                kind: LiteralKind::String,
                value: self.text(node).trim_matches('`').to_string(),
                line,
            }),
            "int_literal" | "float_literal" | "imaginary_literal" | "rune_literal" => {
                Expr::Literal(Literal {
                    kind: LiteralKind::Number,
                    value: self.text(node).to_string(),
                    line,
                })
            }
            "true" | "false" => Expr::Literal(Literal {
                kind: LiteralKind::Bool,
                value: node.kind().to_string(),
                line,
            }),
            "nil" => Expr::Literal(Literal {
                kind: LiteralKind::Nil,
                value: String::new(),
                line,
            }),
            "identifier" | "field_identifier" | "package_identifier" | "type_identifier" => {
                Expr::Identifier {
                    name: self.text(node).to_string(),
                    line,
                }
            }
            "selector_expression" => {
                match (
                    node.child_by_field_name("operand"),
                    node.child_by_field_name("field"),
                ) {
                    (Some(operand), Some(field)) => Expr::Selector {
                        operand: Box::new(self.expr(operand)),
                        field: self.text(field).to_string(),
                        line,
                    },
                    _ => self.other(node),
                }
            }
            "call_expression" => match node.child_by_field_name("function") {
                Some(function) => Expr::Call(CallExpr {
                    function: Box::new(self.expr(function)),
                    arguments: node
                        .child_by_field_name("arguments")
                        .map(|args| {
                            significant_children(args)
                                .into_iter()
                                .map(|arg| self.expr(arg))
                                .collect()
                        })
                        .unwrap_or_default(),
                    line,
                }),
                None => self.other(node),
            },
            "composite_literal" => {
                let type_name = node
                    .child_by_field_name("type")
                    .map(|ty| self.text(ty).to_string());
                let elements = node
                    .child_by_field_name("body")
                    .map(|body| self.elements(body))
                    .unwrap_or_default();
                Expr::Composite(CompositeLit {
                    type_name,
                    elements,
                    line,
                })
            }
            "literal_value" => Expr::Composite(CompositeLit {
                type_name: None,
                elements: self.elements(node),
                line,
            }),
            "unary_expression" => {
                match (
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("operand"),
                ) {
                    (Some(operator), Some(operand)) => Expr::Unary {
                        operator: operator.kind().to_string(),
                        operand: Box::new(self.expr(operand)),
                        line,
                    },
                    _ => self.other(node),
                }
            }
            "parenthesized_expression" | "literal_element" | "element" => {
                match significant_children(node).first() {
                    Some(inner) => self.expr(*inner),
                    None => self.other(node),
                }
            }
            _ => self.other(node),
        }
    }

    fn other(&self, node: Node) -> Expr {
        Expr::Other {
            kind: node.kind().to_string(),
            line: line_of(node),
        }
    }

    fn elements(&self, node: Node) -> Vec<Element> {
        significant_children(node)
            .into_iter()
            .map(|child| {
                if child.kind() != "keyed_element" {
                    return Element::Value(self.expr(child));
                }
                match significant_children(child).as_slice() {
                    [key, value] => Element::KeyValue(KeyValue {
                        key: self.expr(*key),
                        value: self.expr(*value),
                        line: line_of(child),
                    }),
                    _ => Element::Value(self.other(child)),
                }
            })
            .collect()
    }

    fn collect_value_specs(&self, node: Node, specs: &mut Vec<ValueSpec>) {
        if matches!(node.kind(), "const_spec" | "var_spec") {
            let mut cursor = node.walk();
            let names = node
                .children_by_field_name("name", &mut cursor)
                .map(|n| self.text(n).to_string())
                .collect();
            let values = node
                .child_by_field_name("value")
                .map(|v| self.expression_list(v))
                .unwrap_or_default();
            specs.push(ValueSpec {
                names,
                values,
                line: line_of(node),
            });
            return;
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.collect_value_specs(child, specs);
        }
    }
}

/// @ai:intent Decode a Go interpreted string literal, quotes included
/// @ai:example ("\"a\\\"b\"") -> "a\"b"
/// @ai:effects pure
fn decode_interpreted(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
