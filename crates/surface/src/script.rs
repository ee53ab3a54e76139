use crate::error::{Result, SurfaceError};
use crate::language::Language;
use crate::skeleton::{ClassSig, ConstantSig, FunctionSig, InterfaceSkeleton, ParameterSig};
use tree_sitter::{Node, Parser};

/// Interface analyzer for JavaScript and TypeScript sources
///
/// Both grammars share node shapes for everything this analyzer visits;
/// TypeScript adds type annotations, accessibility modifiers, and
/// type-level declarations on top.
pub struct ScriptAnalyzer {
    parser: Parser,
    language: Language,
}

impl ScriptAnalyzer {
    pub fn new_javascript() -> Result<Self> {
        Self::new(Language::JavaScript)
    }

    pub fn new_typescript() -> Result<Self> {
        Self::new(Language::TypeScript)
    }

    fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language()?)
            .map_err(|e| {
                SurfaceError::grammar(format!("Failed to set {} grammar: {e}", language.as_str()))
            })?;
        Ok(Self { parser, language })
    }

    /// Extract the public interface of a JavaScript/TypeScript file
    ///
    /// Partial-result policy: whatever top-level declarations parsed are
    /// extracted; malformed subtrees and dynamic constructs
    /// (`module.exports`, computed names, `export *`) are skipped.
    pub fn extract(&mut self, source: &str, file_path: &str) -> InterfaceSkeleton {
        let mut skeleton = InterfaceSkeleton::new(file_path, self.language);
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
            "function_declaration" | "generator_function_declaration" => {
                if let Some(function) = function_sig(source, node) {
                    skeleton.functions.push(function);
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                if let Some(class) = class_sig(source, node) {
                    skeleton.classes.push(class);
                }
            }
            "lexical_declaration" => {
                self.extract_const_declarators(source, node, skeleton);
            }
            "export_statement" => {
                self.extract_export(source, node, skeleton);
            }
            _ => {}
        }
    }

    fn extract_export(&self, source: &str, node: Node, skeleton: &mut InterfaceSkeleton) {
        // `export * from ...` has no static name list; treated as empty.
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        if children.iter().any(|c| c.kind() == "*") {
            return;
        }

        if let Some(declaration) = node.child_by_field_name("declaration") {
            for name in declared_names(source, declaration) {
                skeleton.exports.push(name);
            }
            self.extract_top_level(source, declaration, skeleton);
            return;
        }

        // `export default <expression>;`
        if children.iter().any(|c| c.kind() == "default") {
            skeleton.exports.push("default".to_string());
            return;
        }

        for child in &children {
            if child.kind() == "export_clause" {
                let mut clause_cursor = child.walk();
                for specifier in child.named_children(&mut clause_cursor) {
                    if specifier.kind() != "export_specifier" {
                        continue;
                    }
                    let exported = specifier
                        .child_by_field_name("alias")
                        .or_else(|| specifier.child_by_field_name("name"));
                    if let Some(name) = exported {
                        skeleton.exports.push(node_text(source, name).to_string());
                    }
                }
            }
        }
    }

    fn extract_const_declarators(
        &self,
        source: &str,
        node: Node,
        skeleton: &mut InterfaceSkeleton,
    ) {
        if node.child(0).map(|c| c.kind()) != Some("const") {
            return;
        }
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier")
            else {
                continue;
            };
            let name = node_text(source, name_node);
            if is_private(name) {
                continue;
            }
            let annotation = declarator
                .child_by_field_name("type")
                .map(|n| annotation_text(source, n));
            if is_shout_case(name) || annotation.is_some() {
                skeleton.constants.push(ConstantSig::new(name, annotation));
            }
        }
    }
}

/// Names a declaration introduces, for export bookkeeping
///
/// Covers value declarations and TypeScript's type-level ones; an
/// anonymous default declaration yields `default`.
fn declared_names(source: &str, declaration: Node) -> Vec<String> {
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut names = Vec::new();
            let mut cursor = declaration.walk();
            for declarator in declaration.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name) = declarator
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                {
                    names.push(node_text(source, name).to_string());
                }
            }
            names
        }
        _ => match declaration.child_by_field_name("name") {
            Some(name) => vec![node_text(source, name).to_string()],
            None => vec!["default".to_string()],
        },
    }
}

fn class_sig(source: &str, node: Node) -> Option<ClassSig> {
    let name = node_text(source, node.child_by_field_name("name")?);
    if is_private(name) {
        return None;
    }

    let mut class = ClassSig::new(name);

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "class_heritage" {
            collect_bases(source, child, &mut class.bases);
        }
    }

    let body = node.child_by_field_name("body")?;
    let mut body_cursor = body.walk();
    for member in body.children(&mut body_cursor) {
        match member.kind() {
            "method_definition" | "abstract_method_signature" => {
                if let Some(method) = method_sig(source, member) {
                    class.methods.push(method);
                }
            }
            "field_definition" | "public_field_definition" => {
                if let Some(constant) = field_constant(source, member) {
                    class.constants.push(constant);
                }
            }
            _ => {}
        }
    }

    Some(class)
}

fn collect_bases(source: &str, heritage: Node, bases: &mut Vec<String>) {
    let mut cursor = heritage.walk();
    for child in heritage.children(&mut cursor) {
        match child.kind() {
            // TypeScript: explicit extends clause; implements names are
            // type-level and not inheritance bases.
            "extends_clause" => {
                let mut extends_cursor = child.walk();
                for base in child.named_children(&mut extends_cursor) {
                    if base.kind() != "type_arguments" {
                        bases.push(node_text(source, base).to_string());
                    }
                }
            }
            "implements_clause" => {}
            // JavaScript: the heritage node wraps the extends expression
            // directly.
            _ if child.is_named() => {
                bases.push(node_text(source, child).to_string());
            }
            _ => {}
        }
    }
}

fn method_sig(source: &str, node: Node) -> Option<FunctionSig> {
    let name_node = node.child_by_field_name("name")?;
    if name_node.kind() == "private_property_identifier"
        || name_node.kind() == "computed_property_name"
    {
        return None;
    }
    let name = node_text(source, name_node);
    if is_private(name) {
        return None;
    }

    let mut function = FunctionSig::new(name);
    function.is_method = true;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "static" => function.is_static = true,
            "async" => function.is_async = true,
            "get" | "set" => function.is_property = true,
            "accessibility_modifier" => {
                let text = node_text(source, child);
                if text == "private" || text == "protected" {
                    return None;
                }
            }
            _ => {}
        }
    }

    if let Some(parameters) = node.child_by_field_name("parameters") {
        let mut parameters_cursor = parameters.walk();
        for parameter in parameters.named_children(&mut parameters_cursor) {
            if let Some(sig) = parameter_sig(source, parameter) {
                function.parameters.push(sig);
            }
        }
    }

    function.return_type = node
        .child_by_field_name("return_type")
        .map(|n| annotation_text(source, n));

    Some(function)
}

fn function_sig(source: &str, node: Node) -> Option<FunctionSig> {
    let name = node_text(source, node.child_by_field_name("name")?);
    if is_private(name) {
        return None;
    }

    let mut function = FunctionSig::new(name);
    function.is_async = node.child(0).is_some_and(|c| c.kind() == "async");

    if let Some(parameters) = node.child_by_field_name("parameters") {
        let mut cursor = parameters.walk();
        for parameter in parameters.named_children(&mut cursor) {
            if let Some(sig) = parameter_sig(source, parameter) {
                function.parameters.push(sig);
            }
        }
    }

    function.return_type = node
        .child_by_field_name("return_type")
        .map(|n| annotation_text(source, n));

    Some(function)
}

fn parameter_sig(source: &str, node: Node) -> Option<ParameterSig> {
    match node.kind() {
        "identifier" => Some(ParameterSig::bare(node_text(source, node))),
        "assignment_pattern" => {
            let left = node.child_by_field_name("left")?;
            let default = node
                .child_by_field_name("right")
                .map(|n| node_text(source, n).to_string());
            Some(ParameterSig::new(node_text(source, left), None, default))
        }
        "rest_pattern" | "object_pattern" | "array_pattern" => {
            Some(ParameterSig::bare(node_text(source, node)))
        }
        // TypeScript parameter wrappers
        "required_parameter" | "optional_parameter" => {
            let pattern = node.child_by_field_name("pattern")?;
            let mut name = node_text(source, pattern).to_string();
            if node.kind() == "optional_parameter" {
                name.push('?');
            }
            let annotation = node
                .child_by_field_name("type")
                .map(|n| annotation_text(source, n));
            let default = node
                .child_by_field_name("value")
                .map(|n| node_text(source, n).to_string());
            Some(ParameterSig::new(name, annotation, default))
        }
        _ => None,
    }
}

fn field_constant(source: &str, node: Node) -> Option<ConstantSig> {
    // Grammar versions disagree on the field name for the property.
    let name_node = node
        .child_by_field_name("name")
        .or_else(|| node.child_by_field_name("property"))?;
    if name_node.kind() == "private_property_identifier"
        || name_node.kind() == "computed_property_name"
    {
        return None;
    }
    let name = node_text(source, name_node);
    if is_private(name) {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "accessibility_modifier" {
            let text = node_text(source, child);
            if text == "private" || text == "protected" {
                return None;
            }
        }
    }

    let annotation = node
        .child_by_field_name("type")
        .map(|n| annotation_text(source, n));
    Some(ConstantSig::new(name, annotation))
}

fn annotation_text(source: &str, node: Node) -> String {
    node_text(source, node)
        .trim_start_matches(':')
        .trim()
        .to_string()
}

fn is_private(name: &str) -> bool {
    (name.starts_with('_') || name.starts_with('#')) && name != "constructor"
}

fn is_shout_case(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_uppercase())
        && !name.chars().any(|c| c.is_ascii_lowercase())
}

fn node_text<'a>(source: &'a str, node: Node) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract_js(source: &str) -> InterfaceSkeleton {
        ScriptAnalyzer::new_javascript()
            .unwrap()
            .extract(source, "test.js")
    }

    fn extract_ts(source: &str) -> InterfaceSkeleton {
        ScriptAnalyzer::new_typescript()
            .unwrap()
            .extract(source, "test.ts")
    }

    #[test]
    fn extracts_js_functions_and_constants() {
        let skeleton = extract_js(
            r#"
const MAX_SIZE = 10;
const helper = () => {};

function greet(name, greeting = "hi") {}
async function load() {}
function _private() {}
"#,
        );
        let constants: Vec<&str> = skeleton.constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(constants, vec!["MAX_SIZE"]);

        let names: Vec<&str> = skeleton.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["greet", "load"]);

        let greet = &skeleton.functions[0];
        assert_eq!(greet.parameters.len(), 2);
        assert_eq!(greet.parameters[1].name, "greeting");
        assert_eq!(greet.parameters[1].default.as_deref(), Some("\"hi\""));
        assert!(skeleton.functions[1].is_async);
    }

    #[test]
    fn extracts_js_class_members() {
        let skeleton = extract_js(
            r#"
class Point extends Base {
  static ORIGIN = null;
  x = 0;
  #secret = 1;
  constructor(x, y) {}
  get size() {}
  static create() {}
  async run() {}
  _internal() {}
}
"#,
        );
        assert_eq!(skeleton.classes.len(), 1);
        let class = &skeleton.classes[0];
        assert_eq!(class.bases, vec!["Base"]);

        let fields: Vec<&str> = class.constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(fields, vec!["ORIGIN", "x"]);

        let methods: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["constructor", "size", "create", "run"]);

        assert!(class.methods[1].is_property);
        assert!(class.methods[2].is_static);
        assert!(class.methods[3].is_async);
        assert!(class.methods.iter().all(|m| m.is_method));
    }

    #[test]
    fn extracts_js_exports() {
        let skeleton = extract_js(
            r#"
function greet() {}
function load() {}
class Point {}

export { greet, load as loader };
export default Point;
"#,
        );
        assert_eq!(skeleton.exports, vec!["greet", "loader", "default"]);
    }

    #[test]
    fn export_star_and_module_exports_are_empty() {
        let skeleton = extract_js(
            r#"
export * from "./other";
module.exports = { a: 1 };
"#,
        );
        assert!(skeleton.exports.is_empty());
    }

    #[test]
    fn extracts_ts_annotations() {
        let skeleton = extract_ts(
            r#"
export const LIMIT: number = 5;
const retries = 3;

export function send(payload: Payload, timeout?: number): Promise<void> {}
"#,
        );
        let constants: Vec<&str> = skeleton.constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(constants, vec!["LIMIT"]);
        assert_eq!(
            skeleton.constants[0].type_annotation.as_deref(),
            Some("number")
        );

        let send = &skeleton.functions[0];
        assert_eq!(send.parameters[0].type_annotation.as_deref(), Some("Payload"));
        assert_eq!(send.parameters[1].name, "timeout?");
        assert_eq!(send.return_type.as_deref(), Some("Promise<void>"));

        let mut exports = skeleton.exports.clone();
        exports.sort();
        assert_eq!(exports, vec!["LIMIT", "send"]);
    }

    #[test]
    fn ts_private_members_are_excluded() {
        let skeleton = extract_ts(
            r#"
export class Client extends Base implements Api {
  private token: string;
  readonly VERSION = "1";
  constructor(opts: Options) {}
  connect(retry = false): Connection { return null as any; }
  protected reset(): void {}
}
"#,
        );
        let class = &skeleton.classes[0];
        assert_eq!(class.bases, vec!["Base"]);

        let fields: Vec<&str> = class.constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(fields, vec!["VERSION"]);

        let methods: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["constructor", "connect"]);
        assert_eq!(class.methods[1].return_type.as_deref(), Some("Connection"));
        assert_eq!(skeleton.exports, vec!["Client"]);
    }

    #[test]
    fn ts_type_declarations_export_names_only() {
        let skeleton = extract_ts(
            r#"
export interface Api {
  ping(): void;
}
export type Payload = { body: string };
"#,
        );
        let mut exports = skeleton.exports.clone();
        exports.sort();
        assert_eq!(exports, vec!["Api", "Payload"]);
        assert!(skeleton.classes.is_empty());
        assert!(skeleton.functions.is_empty());
    }

    #[test]
    fn broken_syntax_yields_partial_skeleton() {
        let skeleton = extract_js(
            r#"
function good() {}
function broken( {
"#,
        );
        assert!(skeleton.functions.iter().any(|f| f.name == "good"));
    }
}
