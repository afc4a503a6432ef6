//! Text rendering for the stylesheet tree
//!
//! Output is fully determined by the tree: two-space indentation, one
//! statement per line, non-empty maps spread over several lines with a
//! trailing comma after every entry.

use crate::ast::{Expr, Item, Param, Stylesheet};

const INDENT: &str = "  ";

impl Stylesheet {
    /// Render to SCSS source text (always newline-terminated unless empty)
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_items(self.items(), 0, &mut out);
        out
    }
}

/// Format a number with at most four fractional digits and no trailing zeros
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let mut text = format!("{:.4}", rounded);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

fn render_items(items: &[Item], depth: usize, out: &mut String) {
    for item in items {
        render_item(item, depth, out);
    }
}

fn render_item(item: &Item, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match item {
        Item::Use(module) => {
            out.push_str(&format!("{}@use {};\n", pad, quote(module)));
        }
        Item::Import(path) => {
            out.push_str(&format!("{}@import {};\n", pad, quote(path)));
        }
        Item::Variable { name, value } => {
            out.push_str(&format!("{}${}: ", pad, name.as_str()));
            render_expr(value, depth, out);
            out.push_str(";\n");
        }
        Item::Mixin { name, params, body } => {
            out.push_str(&format!("{}@mixin {}(", pad, name.as_str()));
            render_params(params, depth, out);
            out.push_str(") {\n");
            render_items(body, depth + 1, out);
            out.push_str(&pad);
            out.push_str("}\n");
        }
        Item::Include { name, args } => {
            out.push_str(&format!("{}@include {}", pad, name.as_str()));
            if !args.is_empty() {
                out.push('(');
                render_args(args, depth, out);
                out.push(')');
            }
            out.push_str(";\n");
        }
        Item::Comment(text) => {
            for line in text.lines() {
                if line.is_empty() {
                    out.push_str(&format!("{}//\n", pad));
                } else {
                    out.push_str(&format!("{}// {}\n", pad, line));
                }
            }
        }
    }
}

fn render_params(params: &[Param], depth: usize, out: &mut String) {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('$');
        out.push_str(param.name.as_str());
        if let Some(default) = &param.default {
            out.push_str(": ");
            render_expr(default, depth, out);
        }
    }
}

fn render_args(args: &[Expr], depth: usize, out: &mut String) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        render_expr(arg, depth, out);
    }
}

fn render_expr(expr: &Expr, depth: usize, out: &mut String) {
    match expr {
        Expr::Str(value) => out.push_str(&quote(value)),
        Expr::Literal(literal) => out.push_str(literal.as_str()),
        Expr::Number(value) => out.push_str(&format_number(*value)),
        Expr::Var(name) => {
            out.push('$');
            out.push_str(name.as_str());
        }
        Expr::Map(entries) if entries.is_empty() => out.push_str("()"),
        Expr::Map(entries) => {
            out.push_str("(\n");
            let entry_pad = INDENT.repeat(depth + 1);
            for (key, value) in entries {
                out.push_str(&entry_pad);
                out.push_str(&quote(key));
                out.push_str(": ");
                render_expr(value, depth + 1, out);
                out.push_str(",\n");
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(')');
        }
        Expr::Call { function, args } => {
            out.push_str(function);
            out.push('(');
            render_args(args, depth, out);
            out.push(')');
        }
        Expr::Null => out.push_str("null"),
        Expr::Escaped(c) => {
            out.push('\\');
            out.push(*c);
        }
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\a "),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
