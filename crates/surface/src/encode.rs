use crate::skeleton::{ClassSig, ConstantSig, FunctionSig, InterfaceSkeleton, ParameterSig};

/// Version tag emitted as the first line of every encoding
///
/// Bump when the token grammar changes so old interface hashes never
/// compare equal to new ones.
pub const ENCODING_VERSION: &str = "scribe-iface v1";

/// Render a skeleton to canonical bytes
///
/// Deterministic and order-independent: constants, functions, classes,
/// class members, and exports are emitted in name-sorted order. Class base
/// lists keep declaration order. File path and language are excluded, so
/// identical interfaces hash identically regardless of location.
pub fn encode(skeleton: &InterfaceSkeleton) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(ENCODING_VERSION);
    out.push('\n');

    for constant in sorted_constants(&skeleton.constants) {
        render_constant(&mut out, constant, "");
    }

    for function in sorted_functions(&skeleton.functions) {
        render_function(&mut out, function, "");
    }

    let mut classes: Vec<&ClassSig> = skeleton.classes.iter().collect();
    classes.sort_by(|a, b| a.name.cmp(&b.name));
    for class in classes {
        render_class(&mut out, class);
    }

    let mut exports: Vec<&str> = skeleton.exports.iter().map(String::as_str).collect();
    exports.sort_unstable();
    exports.dedup();
    for export in exports {
        out.push_str("export ");
        out.push_str(export);
        out.push('\n');
    }

    out.into_bytes()
}

fn sorted_constants(constants: &[ConstantSig]) -> Vec<&ConstantSig> {
    let mut sorted: Vec<&ConstantSig> = constants.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

fn sorted_functions(functions: &[FunctionSig]) -> Vec<&FunctionSig> {
    let mut sorted: Vec<&FunctionSig> = functions.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

fn render_constant(out: &mut String, constant: &ConstantSig, indent: &str) {
    out.push_str(indent);
    out.push_str("const ");
    out.push_str(&constant.name);
    if let Some(annotation) = &constant.type_annotation {
        out.push_str(": ");
        out.push_str(annotation);
    }
    out.push('\n');
}

fn render_function(out: &mut String, function: &FunctionSig, indent: &str) {
    out.push_str(indent);
    out.push_str("fn ");
    out.push_str(&function.name);
    out.push('(');
    for (i, parameter) in function.parameters.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        render_parameter(out, parameter);
    }
    out.push(')');
    if let Some(return_type) = &function.return_type {
        out.push_str(" -> ");
        out.push_str(return_type);
    }
    let flags = flag_tokens(function);
    if !flags.is_empty() {
        out.push_str(" [");
        out.push_str(&flags.join(" "));
        out.push(']');
    }
    out.push('\n');
}

fn render_parameter(out: &mut String, parameter: &ParameterSig) {
    out.push_str(&parameter.name);
    if let Some(annotation) = &parameter.type_annotation {
        out.push_str(": ");
        out.push_str(annotation);
    }
    if let Some(default) = &parameter.default {
        out.push_str(" = ");
        out.push_str(default);
    }
}

fn render_class(out: &mut String, class: &ClassSig) {
    out.push_str("class ");
    out.push_str(&class.name);
    if !class.bases.is_empty() {
        // Declaration order, never sorted: base order drives method
        // resolution in every language we analyze.
        out.push('(');
        out.push_str(&class.bases.join(", "));
        out.push(')');
    }
    out.push('\n');
    for constant in sorted_constants(&class.constants) {
        render_constant(out, constant, "  ");
    }
    for method in sorted_functions(&class.methods) {
        render_function(out, method, "  ");
    }
}

fn flag_tokens(function: &FunctionSig) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if function.is_async {
        flags.push("async");
    }
    if function.is_method {
        flags.push("method");
    }
    if function.is_static {
        flags.push("static");
    }
    if function.is_class_method {
        flags.push("classmethod");
    }
    if function.is_property {
        flags.push("property");
    }
    flags
}
