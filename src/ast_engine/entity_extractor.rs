//! Entity extractor for code analysis.
//!
//! Walks a lowered [`SyntaxTree`] and builds the flat class/method model.
//! Classes are collected wherever they appear; methods only when they are
//! direct members of a class body. A function nested in an `if` inside a
//! class body, a closure inside a method, or a top-level function is not a
//! method.

use tracing::debug;

use crate::ast_engine::parser::AstParser;
use crate::ast_engine::syntax::{ClassNode, FunctionNode, SyntaxNode, SyntaxTree};
use crate::error::AnalysisError;
use crate::types::{ClassEntity, FileAnalysis, MethodEntity};

/// Entity extractor for source units.
pub struct EntityExtractor;

impl EntityExtractor {
    /// Parse `content` and extract its entities.
    ///
    /// `file_path` is only a label; it is copied into the result unchanged.
    pub fn extract(content: &str, file_path: &str) -> Result<FileAnalysis, AnalysisError> {
        let tree = AstParser::new().parse(content)?;
        let analysis = Self::extract_from_tree(&tree, file_path);

        debug!(
            file_path,
            entities = analysis.entities.len(),
            methods = analysis.method_count(),
            "Extracted entities"
        );

        Ok(analysis)
    }

    /// Extract entities from an already lowered tree.
    pub fn extract_from_tree(tree: &SyntaxTree, file_path: &str) -> FileAnalysis {
        let entities = tree
            .walk()
            .filter_map(|node| match node {
                SyntaxNode::Class(class) => Some(Self::class_entity(class)),
                SyntaxNode::Function(_) | SyntaxNode::Other(_) => None,
            })
            .collect();

        FileAnalysis {
            file_path: file_path.to_string(),
            entities,
        }
    }

    fn class_entity(class: &ClassNode) -> ClassEntity {
        let mut entity = ClassEntity::new(&class.name, class.docstring.clone());
        entity.methods = class
            .body
            .iter()
            .filter_map(|member| match member {
                SyntaxNode::Function(function) => Some(Self::method_entity(function)),
                SyntaxNode::Class(_) | SyntaxNode::Other(_) => None,
            })
            .collect();
        entity
    }

    fn method_entity(function: &FunctionNode) -> MethodEntity {
        MethodEntity::new(
            &function.name,
            function.params.clone(),
            function.docstring.clone(),
            function.line,
        )
    }
}

/// Parse a source unit into a [`FileAnalysis`].
pub fn extract(source_text: &str, file_path: &str) -> Result<FileAnalysis, AnalysisError> {
    EntityExtractor::extract(source_text, file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::USER_SERVICE_SOURCE;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_user_service_example() {
        let file_path = "services/user_service.py";
        let analysis = extract(USER_SERVICE_SOURCE, file_path).unwrap();

        assert_eq!(analysis.file_path, file_path);
        assert_eq!(analysis.entities.len(), 1);

        let class = &analysis.entities[0];
        assert_eq!(class.name, "UserService");
        assert_eq!(
            serde_json::to_value(class.kind).unwrap(),
            serde_json::json!("class")
        );
        assert!(class
            .docstring
            .as_deref()
            .unwrap()
            .contains("A service that handles user-related business logic."));

        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "create_user"]);

        let init = &class.methods[0];
        assert_eq!(init.args, vec!["self", "db_session"]);
        assert_eq!(init.docstring, None);
        assert_eq!(init.line_start, 8);

        let create = &class.methods[1];
        assert_eq!(create.args, vec!["self", "username", "email", "age"]);
        assert_eq!(create.line_start, 11);
        assert!(create
            .docstring
            .as_deref()
            .unwrap()
            .starts_with("Create a new user and save it to the database."));
    }

    #[test]
    fn test_empty_source() {
        let analysis = extract("", "empty.py").unwrap();
        assert_eq!(analysis.file_path, "empty.py");
        assert!(analysis.entities.is_empty());
    }

    #[test]
    fn test_file_path_is_copied_verbatim() {
        let analysis = extract("x = 1\n", "  not/a/real path.txt").unwrap();
        assert_eq!(analysis.file_path, "  not/a/real path.txt");
        assert!(analysis.entities.is_empty());
    }

    #[test]
    fn test_syntax_error_returns_no_analysis() {
        let result = extract("class InvalidClass: def func(", "invalid.py");
        assert!(matches!(result, Err(AnalysisError::Syntax { .. })));
    }

    #[test]
    fn test_top_level_functions_are_ignored() {
        let code = "def helper(x):\n    return x\n\nclass A:\n    def m(self):\n        pass\n";
        let analysis = extract(code, "a.py").unwrap();
        assert_eq!(analysis.entities.len(), 1);
        assert_eq!(analysis.method_names(), vec!["m"]);
    }

    #[test]
    fn test_class_without_methods_has_empty_list() {
        let analysis = extract("class Marker:\n    pass\n", "m.py").unwrap();
        assert_eq!(analysis.entities[0].methods, Vec::new());
        assert_eq!(analysis.entities[0].docstring, None);
    }

    #[test]
    fn test_empty_docstring_differs_from_missing() {
        let code = "class A:\n    \"\"\n    def m(self):\n        \"\"\"\"\"\"\n    def n(self):\n        pass\n";
        let analysis = extract(code, "a.py").unwrap();
        let class = &analysis.entities[0];
        assert_eq!(class.docstring.as_deref(), Some(""));
        assert_eq!(class.methods[0].docstring.as_deref(), Some(""));
        assert_eq!(class.methods[1].docstring, None);
    }

    #[test]
    fn test_non_leading_string_is_not_a_docstring() {
        let code = "class A:\n    x = 1\n    \"\"\"late\"\"\"\n";
        let analysis = extract(code, "a.py").unwrap();
        assert_eq!(analysis.entities[0].docstring, None);
    }

    #[test]
    fn test_nested_classes_in_breadth_first_order() {
        let code = r#"
class Outer:
    class Inner:
        def inner_method(self):
            pass

    def outer_method(self):
        class Local:
            pass

class Second:
    pass
"#;
        let analysis = extract(code, "n.py").unwrap();
        let names: Vec<&str> = analysis.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Second", "Inner", "Local"]);

        // Inner is a class, not a method of Outer.
        assert_eq!(analysis.entities[0].methods.len(), 1);
        assert_eq!(analysis.entities[0].methods[0].name, "outer_method");
        assert_eq!(analysis.entities[2].methods[0].name, "inner_method");
    }

    #[test]
    fn test_conditional_members_are_not_methods() {
        let code = r#"
class Platform:
    if True:
        def maybe(self):
            pass

    def always(self):
        def closure():
            pass
        return closure
"#;
        let analysis = extract(code, "p.py").unwrap();
        assert_eq!(analysis.method_names(), vec!["always"]);
    }

    #[test]
    fn test_class_inside_if_is_found() {
        let code = "import sys\nif sys.version_info >= (3, 8):\n    class Modern:\n        def run(self): pass\nelse:\n    class Legacy:\n        pass\n";
        let analysis = extract(code, "compat.py").unwrap();
        let names: Vec<&str> = analysis.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Modern", "Legacy"]);
        assert_eq!(analysis.entities[0].methods[0].line_start, 4);
    }

    fn class_names(code: &str) -> Vec<String> {
        extract(code, "order.py")
            .unwrap()
            .entities
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn test_statement_nesting_counts_one_level() {
        // A class under `if`/`try` sits at the same depth as a class nested
        // in a class body, so it comes first when its statement does.
        assert_eq!(
            class_names("if x:\n    class A: pass\nclass B:\n    class C: pass\n"),
            vec!["B", "A", "C"]
        );
        assert_eq!(
            class_names("try:\n    class A: pass\nexcept E:\n    pass\nclass B:\n    class C: pass\n"),
            vec!["B", "A", "C"]
        );
        assert_eq!(
            class_names("class B:\n    class C: pass\nwith ctx:\n    class A: pass\n"),
            vec!["B", "C", "A"]
        );
    }

    #[test]
    fn test_first_match_follows_statement_depth() {
        let code = "if ready:\n    class Early:\n        def run(self): pass\nclass Wrapper:\n    class Late:\n        def run(self): pass\n";
        let analysis = extract(code, "first.py").unwrap();
        let (class, method) = analysis.find_method("run").unwrap();
        assert_eq!(class.name, "Early");
        assert_eq!(method.line_start, 3);
    }

    #[test]
    fn test_handler_and_else_classes_keep_depth() {
        // Python: Try -> ExceptHandler -> class, Try -> orelse class.
        let code = "try:\n    pass\nexcept E:\n    class Handler: pass\nelse:\n    class Fallback: pass\nclass Top:\n    class Nested: pass\n";
        assert_eq!(class_names(code), vec!["Top", "Fallback", "Nested", "Handler"]);
    }

    #[test]
    fn test_duplicate_classes_are_kept() {
        let code = "class A:\n    pass\n\nclass A:\n    def m(self): pass\n";
        let analysis = extract(code, "dup.py").unwrap();
        assert_eq!(analysis.entities.len(), 2);
        assert!(analysis.entities[0].methods.is_empty());
        assert_eq!(analysis.entities[1].methods.len(), 1);
    }

    #[test]
    fn test_method_lines_follow_declaration_order() {
        let code = "class A:\n    def a(self): pass\n    @staticmethod\n    def b(): pass\n    async def c(self): pass\n    def d(cls, *args, **kwargs): pass\n";
        let analysis = extract(code, "a.py").unwrap();
        let methods = &analysis.entities[0].methods;
        assert_eq!(methods.len(), 4);

        let lines: Vec<usize> = methods.iter().map(|m| m.line_start).collect();
        assert_eq!(lines, vec![2, 4, 5, 6]);
        assert!(lines.windows(2).all(|w| w[0] <= w[1]));

        assert!(methods[1].args.is_empty());
        assert_eq!(methods[3].args, vec!["cls", "args", "kwargs"]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let first = extract(USER_SERVICE_SOURCE, "a.py").unwrap();
        let second = extract(USER_SERVICE_SOURCE, "a.py").unwrap();
        assert_eq!(first, second);
    }
}
