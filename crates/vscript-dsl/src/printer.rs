use crate::ast::{Rule, Script, TypeDecl, ValidatorDecl};

/// Print a whole script to canonical DSL text.
///
/// Type declarations come first, then validators, each separated by a
/// blank line. Parsing the output yields a script equal to the input.
pub fn print(script: &Script) -> String {
    let mut output = String::new();
    let mut first = true;

    for decl in &script.type_decls {
        if !first {
            output.push('\n');
        }
        first = false;
        print_type_into(decl, &mut output);
    }

    for decl in &script.validator_decls {
        if !first {
            output.push('\n');
        }
        first = false;
        print_validator_into(decl, &mut output);
    }

    output
}

/// Print a single type declaration.
pub fn print_type(decl: &TypeDecl) -> String {
    let mut output = String::new();
    print_type_into(decl, &mut output);
    output
}

/// Print a single validator declaration.
pub fn print_validator(decl: &ValidatorDecl) -> String {
    let mut output = String::new();
    print_validator_into(decl, &mut output);
    output
}

fn print_type_into(decl: &TypeDecl, output: &mut String) {
    output.push_str("type ");
    output.push_str(&decl.name);
    output.push_str(" {\n");

    for field in &decl.fields {
        output.push_str("    ");
        output.push_str(&field.field_type);
        output.push(' ');
        output.push_str(&field.name);
        output.push_str(";\n");
    }

    output.push_str("}\n");
}

fn print_validator_into(decl: &ValidatorDecl, output: &mut String) {
    output.push_str("validate on ");
    output.push_str(&decl.target);
    output.push('(');
    output.push_str(&decl.params.join(", "));
    output.push(')');

    if let Some(guard) = &decl.guard {
        output.push_str(&format!(" if {guard}"));
    }

    output.push_str(" {\n");
    for rule in &decl.rules {
        output.push_str("    ");
        print_rule(rule, output);
        output.push('\n');
    }
    output.push_str("}\n");
}

fn print_rule(rule: &Rule, output: &mut String) {
    match rule {
        Rule::Check {
            verdict,
            condition,
            message,
        } => {
            output.push_str(verdict.as_str());
            output.push(' ');
            output.push_str(&condition.to_string());
            if let Some(message) = message {
                output.push_str(" -> \"");
                output.push_str(message);
                output.push('"');
            }
        }
        Rule::Validate { field, args } => {
            output.push_str("validate ");
            output.push_str(field);
            output.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    output.push_str(", ");
                }
                output.push_str(&arg.to_string());
            }
            output.push(')');
        }
    }
    output.push(';');
}
