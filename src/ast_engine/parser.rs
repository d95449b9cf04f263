//! Tree-sitter based Python parser.
//!
//! Parsing is strict: tree-sitter recovers from malformed input by inserting
//! `ERROR` and `MISSING` nodes, and any such node fails the whole parse. On
//! success the CST is lowered into a [`SyntaxTree`].

use tree_sitter::{Language, Node, Parser};
use tracing::debug;

use crate::ast_engine::docstring;
use crate::ast_engine::syntax::{ClassNode, FunctionNode, OtherNode, SyntaxNode, SyntaxTree};
use crate::error::AnalysisError;

/// Statement kinds whose children may hold class or function definitions.
const CONTAINER_KINDS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "with_statement",
    "match_statement",
    "case_clause",
];

/// Wrapper kinds whose statements belong directly to the enclosing statement.
const SPLICED_KINDS: &[&str] = &["block", "else_clause", "finally_clause"];

/// Tree-sitter based parser for the supported grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstParser;

impl AstParser {
    pub fn new() -> Self {
        Self
    }

    fn language() -> Language {
        tree_sitter_python::language()
    }

    /// Parse source text into a lowered syntax tree.
    pub fn parse(&self, content: &str) -> Result<SyntaxTree, AnalysisError> {
        // Parser is not Sync, so each call gets its own.
        let mut parser = Parser::new();
        parser
            .set_language(&Self::language())
            .map_err(|e| AnalysisError::Parser(e.to_string()))?;

        let tree = parser
            .parse(content.as_bytes(), None)
            .ok_or_else(|| AnalysisError::Parser("parse did not complete".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let error = Self::first_error(root, content).unwrap_or_else(|| AnalysisError::Syntax {
                line: root.start_position().row + 1,
                column: root.start_position().column,
                message: "invalid syntax".to_string(),
            });
            debug!(error = %error, "Rejected malformed source");
            return Err(error);
        }

        if let Err(error) = check_constructs(root) {
            debug!(error = %error, "Rejected invalid construct");
            return Err(error);
        }

        Ok(SyntaxTree {
            body: lower_children(root, content),
        })
    }

    /// Locate the first `ERROR` or `MISSING` node in document order.
    fn first_error(node: Node, content: &str) -> Option<AnalysisError> {
        if node.is_missing() {
            let pos = node.start_position();
            return Some(AnalysisError::Syntax {
                line: pos.row + 1,
                column: pos.column,
                message: format!("expected `{}`", node.kind()),
            });
        }

        if node.is_error() {
            let pos = node.start_position();
            let snippet: String = content[node.byte_range()]
                .lines()
                .next()
                .unwrap_or("")
                .chars()
                .take(40)
                .collect();
            let message = if snippet.trim().is_empty() {
                "invalid syntax".to_string()
            } else {
                format!("invalid syntax near `{}`", snippet.trim())
            };
            return Some(AnalysisError::Syntax {
                line: pos.row + 1,
                column: pos.column,
                message,
            });
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        children
            .into_iter()
            .filter(|child| child.has_error())
            .find_map(|child| Self::first_error(child, content))
    }
}

fn text(node: Node, content: &str) -> String {
    content[node.byte_range()].to_string()
}

fn syntax_error(node: Node, message: &str) -> AnalysisError {
    let pos = node.start_position();
    AnalysisError::Syntax {
        line: pos.row + 1,
        column: pos.column,
        message: message.to_string(),
    }
}

/// Reject constructs the grammar accepts but the language does not. The
/// first offending node in document order is reported.
fn check_constructs(root: Node) -> Result<(), AnalysisError> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "parameters" | "lambda_parameters" => check_parameter_order(node)?,
            "augmented_assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    if !is_single_target(left) {
                        return Err(syntax_error(left, "illegal target for augmented assignment"));
                    }
                }
            }
            "delete_statement" => {
                let mut cursor = node.walk();
                let targets: Vec<Node> = node.named_children(&mut cursor).collect();
                if let Some(target) = targets
                    .into_iter()
                    .find(|t| t.kind() != "comment" && !is_delete_target(*t))
                {
                    return Err(syntax_error(target, "cannot delete expression"));
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}

/// Positional parameters without a default may not follow one with a default.
fn check_parameter_order(params: Node) -> Result<(), AnalysisError> {
    let mut seen_default = false;
    let mut keyword_only = false;

    let mut cursor = params.walk();
    let children: Vec<Node> = params.named_children(&mut cursor).collect();
    for param in children {
        let required = match param.kind() {
            "default_parameter" | "typed_default_parameter" => {
                seen_default = true;
                false
            }
            "list_splat_pattern" | "keyword_separator" => {
                keyword_only = true;
                false
            }
            "identifier" => true,
            "typed_parameter" => match param.named_child(0).map(|n| n.kind()) {
                Some("list_splat_pattern") => {
                    keyword_only = true;
                    false
                }
                Some("dictionary_splat_pattern") => false,
                _ => true,
            },
            _ => false,
        };

        if required && seen_default && !keyword_only {
            return Err(syntax_error(
                param,
                "parameter without a default follows parameter with a default",
            ));
        }
    }
    Ok(())
}

fn is_single_target(node: Node) -> bool {
    match node.kind() {
        "identifier" | "attribute" | "subscript" => true,
        "parenthesized_expression" => node.named_child(0).is_some_and(is_single_target),
        _ => false,
    }
}

fn is_delete_target(node: Node) -> bool {
    match node.kind() {
        "identifier" | "attribute" | "subscript" => true,
        "tuple" | "list" | "expression_list" | "parenthesized_expression" => {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            children
                .into_iter()
                .filter(|child| child.kind() != "comment")
                .all(is_delete_target)
        }
        _ => false,
    }
}

fn lower_children(node: Node, content: &str) -> Vec<SyntaxNode> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    lower_sequence(children, content)
}

/// Lower a run of sibling nodes. Blocks and `else`/`finally` clauses are
/// spliced into the sequence, and an `elif` owns every clause after it, so
/// nesting depth follows the language's statement tree rather than the CST.
fn lower_sequence(nodes: Vec<Node>, content: &str) -> Vec<SyntaxNode> {
    let mut lowered = Vec::with_capacity(nodes.len());
    let mut rest = nodes.into_iter();

    while let Some(node) = rest.next() {
        match node.kind() {
            kind if SPLICED_KINDS.contains(&kind) => lowered.extend(lower_children(node, content)),
            "elif_clause" => {
                let mut children = lower_children(node, content);
                children.extend(lower_sequence(rest.by_ref().collect(), content));
                lowered.push(SyntaxNode::Other(OtherNode {
                    kind: node.kind().to_string(),
                    line: node.start_position().row + 1,
                    children,
                }));
            }
            _ => lowered.push(lower(node, content)),
        }
    }
    lowered
}

fn lower(node: Node, content: &str) -> SyntaxNode {
    match node.kind() {
        "class_definition" => lower_class(node, content),
        "function_definition" => lower_function(node, content),
        // Decorators are expressions; only the wrapped definition matters.
        "decorated_definition" => match node.child_by_field_name("definition") {
            Some(definition) => lower(definition, content),
            None => lower_other(node, content),
        },
        _ => lower_other(node, content),
    }
}

fn lower_class(node: Node, content: &str) -> SyntaxNode {
    let body = node.child_by_field_name("body");
    SyntaxNode::Class(ClassNode {
        name: node
            .child_by_field_name("name")
            .map(|n| text(n, content))
            .unwrap_or_default(),
        docstring: body.and_then(|b| docstring::from_block(b, content)),
        line: node.start_position().row + 1,
        body: body.map(|b| lower_children(b, content)).unwrap_or_default(),
    })
}

fn lower_function(node: Node, content: &str) -> SyntaxNode {
    let body = node.child_by_field_name("body");
    SyntaxNode::Function(FunctionNode {
        name: node
            .child_by_field_name("name")
            .map(|n| text(n, content))
            .unwrap_or_default(),
        params: node
            .child_by_field_name("parameters")
            .map(|p| parameter_names(p, content))
            .unwrap_or_default(),
        docstring: body.and_then(|b| docstring::from_block(b, content)),
        line: node.start_position().row + 1,
        is_async: node.child(0).is_some_and(|first| first.kind() == "async"),
        body: body.map(|b| lower_children(b, content)).unwrap_or_default(),
    })
}

fn lower_other(node: Node, content: &str) -> SyntaxNode {
    let children = if CONTAINER_KINDS.contains(&node.kind()) {
        lower_children(node, content)
    } else {
        Vec::new()
    };

    SyntaxNode::Other(OtherNode {
        kind: node.kind().to_string(),
        line: node.start_position().row + 1,
        children,
    })
}

/// Names declared in a `parameters` node, without defaults, annotations or
/// splat markers. Bare `*` and `/` separators are skipped.
fn parameter_names(params: Node, content: &str) -> Vec<String> {
    let mut cursor = params.walk();
    let children: Vec<Node> = params.named_children(&mut cursor).collect();

    children
        .into_iter()
        .filter_map(|param| match param.kind() {
            "identifier" => Some(text(param, content)),
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .map(|name| text(name, content)),
            "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                declared_identifier(param, content)
            }
            _ => None,
        })
        .collect()
}

fn declared_identifier(node: Node, content: &str) -> Option<String> {
    let first = node.named_child(0)?;
    match first.kind() {
        "identifier" => Some(text(first, content)),
        "list_splat_pattern" | "dictionary_splat_pattern" => declared_identifier(first, content),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn only_function(tree: &SyntaxTree) -> &FunctionNode {
        tree.walk()
            .find_map(|node| match node {
                SyntaxNode::Function(f) => Some(f),
                _ => None,
            })
            .expect("no function in tree")
    }

    #[test]
    fn test_parse_empty_source() {
        let tree = AstParser::new().parse("").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_parse_class_with_method() {
        let code = r#"
class Greeter:
    """Greets people."""

    def greet(self, name: str) -> str:
        return f"Hello, {name}!"
"#;
        let tree = AstParser::new().parse(code).unwrap();
        assert_eq!(tree.body.len(), 1);

        let SyntaxNode::Class(class) = &tree.body[0] else {
            panic!("expected a class node");
        };
        assert_eq!(class.name, "Greeter");
        assert_eq!(class.line, 2);
        assert_eq!(class.docstring.as_deref(), Some("Greets people."));

        let function = only_function(&tree);
        assert_eq!(function.name, "greet");
        assert_eq!(function.params, vec!["self", "name"]);
        assert_eq!(function.line, 5);
        assert!(!function.is_async);
        assert_eq!(function.docstring, None);
    }

    #[test]
    fn test_parameter_names_only() {
        let code = "def f(a, b: int, c=1, d: str = 'x', /, *args, e, f: int = 2, **kwargs): pass\n";
        let tree = AstParser::new().parse(code).unwrap();
        assert_eq!(
            only_function(&tree).params,
            vec!["a", "b", "c", "d", "args", "e", "f", "kwargs"]
        );
    }

    #[test]
    fn test_keyword_only_separator_is_skipped() {
        let tree = AstParser::new().parse("def g(self, *, flag): pass\n").unwrap();
        assert_eq!(only_function(&tree).params, vec!["self", "flag"]);
    }

    #[test]
    fn test_decorated_and_async_definitions_are_unwrapped() {
        let code = "class A:\n    @property\n    def value(self):\n        return 1\n\n    async def fetch(self):\n        pass\n";
        let tree = AstParser::new().parse(code).unwrap();
        let SyntaxNode::Class(class) = &tree.body[0] else {
            panic!("expected a class node");
        };

        let functions: Vec<&FunctionNode> = class
            .body
            .iter()
            .filter_map(|node| match node {
                SyntaxNode::Function(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "value");
        assert_eq!(functions[0].line, 3);
        assert_eq!(functions[1].name, "fetch");
        assert!(functions[1].is_async);
    }

    #[test]
    fn test_expressions_are_leaves() {
        let tree = AstParser::new().parse("x = [i for i in range(10)]\n").unwrap();
        assert_eq!(tree.body.len(), 1);
        assert!(tree.body[0].children().is_empty());
    }

    fn kinds(nodes: &[SyntaxNode]) -> Vec<&str> {
        nodes
            .iter()
            .map(|node| match node {
                SyntaxNode::Class(_) => "class",
                SyntaxNode::Function(_) => "function",
                SyntaxNode::Other(other) => other.kind.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_blocks_are_spliced_into_their_statement() {
        let code = "try:\n    class A: pass\nexcept ValueError:\n    class B: pass\nelse:\n    class C: pass\nfinally:\n    class D: pass\n";
        let tree = AstParser::new().parse(code).unwrap();
        assert_eq!(kinds(&tree.body), vec!["try_statement"]);

        // body, handler, orelse and finalbody hang directly off the statement
        let statement = tree.body[0].children();
        assert_eq!(kinds(statement), vec!["class", "except_clause", "class", "class"]);
        assert_eq!(kinds(statement[1].children()), vec!["identifier", "class"]);
    }

    #[test]
    fn test_elif_owns_the_clauses_after_it() {
        let code = "if a:\n    class A: pass\nelif b:\n    class B: pass\nelif c:\n    class C: pass\nelse:\n    class D: pass\n";
        let tree = AstParser::new().parse(code).unwrap();

        let statement = tree.body[0].children();
        assert_eq!(kinds(statement), vec!["identifier", "class", "elif_clause"]);

        let first_elif = statement[2].children();
        assert_eq!(kinds(first_elif), vec!["identifier", "class", "elif_clause"]);
        assert_eq!(first_elif[2].line(), 5);

        let second_elif = first_elif[2].children();
        assert_eq!(kinds(second_elif), vec!["identifier", "class", "class"]);
    }

    #[test]
    fn test_loop_and_with_bodies_are_spliced() {
        let code = "for x in y:\n    class A: pass\nelse:\n    class B: pass\nwith open(p) as f:\n    class C: pass\n";
        let tree = AstParser::new().parse(code).unwrap();
        assert_eq!(kinds(&tree.body), vec!["for_statement", "with_statement"]);
        assert_eq!(
            kinds(tree.body[0].children()),
            vec!["identifier", "identifier", "class", "class"]
        );
        assert_eq!(kinds(tree.body[1].children()).last(), Some(&"class"));
    }

    #[test]
    fn test_non_default_parameter_after_default_is_rejected() {
        let err = AstParser::new().parse("def f(a=1, b): pass\n").unwrap_err();
        match err {
            AnalysisError::Syntax { line, column, message } => {
                assert_eq!(line, 1);
                assert_eq!(column, 11);
                assert!(message.contains("without a default"));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(AstParser::new().parse("def f(a: int = 1, b: int): pass\n").is_err());
        assert!(AstParser::new().parse("def f(a=1, /, b): pass\n").is_err());
        assert!(AstParser::new().parse("g = lambda a=1, b: a\n").is_err());
    }

    #[test]
    fn test_keyword_only_parameters_may_omit_defaults() {
        let parser = AstParser::new();
        assert!(parser.parse("def f(a=1, *, b): pass\n").is_ok());
        assert!(parser.parse("def f(a=1, *args, b, **kw): pass\n").is_ok());
        assert!(parser.parse("def f(a, b=2, /, c=3): pass\n").is_ok());
        assert!(parser.parse("def f(a=1, *args: int, b): pass\n").is_ok());
    }

    #[test]
    fn test_invalid_assignment_targets_are_rejected() {
        let parser = AstParser::new();
        assert!(parser.parse("(a, b) += 1\n").unwrap_err().is_syntax());
        assert!(parser.parse("del f()\n").unwrap_err().is_syntax());

        assert!(parser.parse("x += 1\nself.n -= 1\nd[k] *= 2\n(y) += 1\n").is_ok());
        assert!(parser.parse("del a, b.c, d[0], (e, [f])\n").is_ok());
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = AstParser::new()
            .parse("class InvalidClass: def func(")
            .unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_syntax_error_position() {
        let err = AstParser::new()
            .parse("class Ok:\n    pass\n\ndef broken(:\n    pass\n")
            .unwrap_err();
        match err {
            AnalysisError::Syntax { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }
}
