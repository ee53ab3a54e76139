use crate::error::{Result, SurfaceError};
use crate::language::Language;
use crate::skeleton::{ClassSig, ConstantSig, FunctionSig, InterfaceSkeleton, ParameterSig};
use tree_sitter::{Node, Parser};

/// Dunder names that stay public despite the underscore prefix
const LIFECYCLE_ALLOWLIST: &[&str] = &["__init__", "__new__", "__call__"];

/// Interface analyzer for Python sources
pub struct PythonAnalyzer {
    parser: Parser,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&Language::Python.tree_sitter_language()?)
            .map_err(|e| SurfaceError::grammar(format!("Failed to set python grammar: {e}")))?;
        Ok(Self { parser })
    }

    /// Extract the public interface of a Python file
    ///
    /// Tolerates broken syntax: whatever top-level declarations parsed are
    /// extracted, malformed subtrees are skipped. A file that parses to
    /// nothing yields an empty skeleton, which is a valid result.
    pub fn extract(&mut self, source: &str, file_path: &str) -> InterfaceSkeleton {
        let mut skeleton = InterfaceSkeleton::new(file_path, Language::Python);
        let Some(tree) = self.parser.parse(source, None) else {
            return skeleton;
        };

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            self.extract_top_level(source, child, &mut skeleton);
        }
        skeleton
    }

    fn extract_top_level(&self, source: &str, node: Node, skeleton: &mut InterfaceSkeleton) {
        match node.kind() {
            "function_definition" => {
                if let Some(function) = function_sig(source, node, &[], false) {
                    skeleton.functions.push(function);
                }
            }
            "decorated_definition" => {
                let decorators = decorator_names(source, node);
                let Some(definition) = node.child_by_field_name("definition") else {
                    return;
                };
                match definition.kind() {
                    "function_definition" => {
                        if let Some(function) = function_sig(source, definition, &decorators, false)
                        {
                            skeleton.functions.push(function);
                        }
                    }
                    "class_definition" => {
                        if let Some(class) = self.class_sig(source, definition) {
                            skeleton.classes.push(class);
                        }
                    }
                    _ => {}
                }
            }
            "class_definition" => {
                if let Some(class) = self.class_sig(source, node) {
                    skeleton.classes.push(class);
                }
            }
            "expression_statement" => {
                self.extract_assignment(source, node, skeleton);
            }
            _ => {}
        }
    }

    fn extract_assignment(&self, source: &str, node: Node, skeleton: &mut InterfaceSkeleton) {
        let Some(assignment) = node.named_child(0).filter(|n| n.kind() == "assignment") else {
            return;
        };
        let Some(left) = assignment.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let name = node_text(source, left);

        if name == "__all__" {
            skeleton.exports = literal_export_list(source, &assignment);
            return;
        }

        let annotation = assignment
            .child_by_field_name("type")
            .map(|n| node_text(source, n).to_string());
        if let Some(constant) = constant_sig(name, annotation) {
            skeleton.constants.push(constant);
        }
    }

    fn class_sig(&self, source: &str, node: Node) -> Option<ClassSig> {
        let name = node_text(source, node.child_by_field_name("name")?);
        if is_private(name) {
            return None;
        }

        let mut class = ClassSig::new(name);

        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                // Keyword arguments (metaclass=...) are not base types.
                if base.kind() == "keyword_argument" {
                    continue;
                }
                class.bases.push(node_text(source, base).to_string());
            }
        }

        let body = node.child_by_field_name("body")?;
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "function_definition" => {
                    if let Some(method) = function_sig(source, member, &[], true) {
                        class.methods.push(method);
                    }
                }
                "decorated_definition" => {
                    let decorators = decorator_names(source, member);
                    if let Some(definition) = member
                        .child_by_field_name("definition")
                        .filter(|n| n.kind() == "function_definition")
                    {
                        if let Some(method) = function_sig(source, definition, &decorators, true) {
                            class.methods.push(method);
                        }
                    }
                }
                "expression_statement" => {
                    if let Some(assignment) = member
                        .named_child(0)
                        .filter(|n| n.kind() == "assignment")
                    {
                        if let Some(left) = assignment
                            .child_by_field_name("left")
                            .filter(|n| n.kind() == "identifier")
                        {
                            let annotation = assignment
                                .child_by_field_name("type")
                                .map(|n| node_text(source, n).to_string());
                            if let Some(constant) =
                                constant_sig(node_text(source, left), annotation)
                            {
                                class.constants.push(constant);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Some(class)
    }
}

/// Build a function signature, applying visibility and receiver rules
fn function_sig(
    source: &str,
    node: Node,
    decorators: &[String],
    is_method: bool,
) -> Option<FunctionSig> {
    let name = node_text(source, node.child_by_field_name("name")?);
    if is_private(name) {
        return None;
    }

    let mut function = FunctionSig::new(name);
    function.is_method = is_method;
    function.is_async = node.child(0).is_some_and(|c| c.kind() == "async");
    for decorator in decorators {
        match decorator.as_str() {
            "staticmethod" => function.is_static = true,
            "classmethod" => function.is_class_method = true,
            "property" => function.is_property = true,
            other if other.ends_with(".setter") || other.ends_with(".deleter") => {
                function.is_property = true;
            }
            // Unrecognized decorations never reach the skeleton.
            _ => {}
        }
    }

    if let Some(parameters) = node.child_by_field_name("parameters") {
        let mut cursor = parameters.walk();
        for parameter in parameters.named_children(&mut cursor) {
            if let Some(sig) = parameter_sig(source, parameter) {
                function.parameters.push(sig);
            }
        }
    }

    // Elide the implicit receiver (self / cls). Static methods have none.
    if is_method && !function.is_static && !function.parameters.is_empty() {
        function.parameters.remove(0);
    }

    function.return_type = node
        .child_by_field_name("return_type")
        .map(|n| node_text(source, n).to_string());

    Some(function)
}

fn parameter_sig(source: &str, node: Node) -> Option<ParameterSig> {
    match node.kind() {
        "identifier" => Some(ParameterSig::bare(node_text(source, node))),
        "typed_parameter" => {
            let pattern = node.named_child(0)?;
            let annotation = node
                .child_by_field_name("type")
                .map(|n| node_text(source, n).to_string());
            Some(ParameterSig::new(
                node_text(source, pattern),
                annotation,
                None,
            ))
        }
        "default_parameter" => {
            let name = node.child_by_field_name("name")?;
            let default = node
                .child_by_field_name("value")
                .map(|n| node_text(source, n).to_string());
            Some(ParameterSig::new(node_text(source, name), None, default))
        }
        "typed_default_parameter" => {
            let name = node.child_by_field_name("name")?;
            let annotation = node
                .child_by_field_name("type")
                .map(|n| node_text(source, n).to_string());
            let default = node
                .child_by_field_name("value")
                .map(|n| node_text(source, n).to_string());
            Some(ParameterSig::new(
                node_text(source, name),
                annotation,
                default,
            ))
        }
        "list_splat_pattern" | "dictionary_splat_pattern" => {
            Some(ParameterSig::bare(node_text(source, node)))
        }
        "keyword_separator" | "positional_separator" => {
            Some(ParameterSig::bare(node_text(source, node)))
        }
        _ => None,
    }
}

/// Names of decorators applied to a decorated definition, without the `@`
fn decorator_names(source: &str, node: Node) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            let text = node_text(source, child);
            names.push(text.trim_start_matches('@').trim().to_string());
        }
    }
    names
}

/// Parse a literal `__all__` list; any computed form yields no exports
fn literal_export_list(source: &str, assignment: &Node) -> Vec<String> {
    let Some(right) = assignment.child_by_field_name("right") else {
        return Vec::new();
    };
    if right.kind() != "list" && right.kind() != "tuple" {
        return Vec::new();
    }

    let mut exports = Vec::new();
    let mut cursor = right.walk();
    for element in right.named_children(&mut cursor) {
        match element.kind() {
            "string" => {
                let text = node_text(source, element);
                exports.push(text.trim_matches(|c| c == '"' || c == '\'').to_string());
            }
            "comment" => {}
            _ => return Vec::new(),
        }
    }
    exports
}

fn constant_sig(name: &str, annotation: Option<String>) -> Option<ConstantSig> {
    if is_private(name) {
        return None;
    }
    // Without module-level visibility syntax, a binding counts as public
    // surface when it is shout-case or explicitly annotated.
    if is_shout_case(name) || annotation.is_some() {
        return Some(ConstantSig::new(name, annotation));
    }
    None
}

fn is_private(name: &str) -> bool {
    name.starts_with('_') && !LIFECYCLE_ALLOWLIST.contains(&name)
}

fn is_shout_case(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && !name.chars().any(|c| c.is_ascii_lowercase())
}

fn node_text<'a>(source: &'a str, node: Node) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}
