//! XML pass: turns the AST document into a [`Program`] plus a populated
//! [`ClassRegistry`].
//!
//! The document is read through a read-only DOM; every structural rule is
//! checked here so the evaluator can assume a well-formed tree. Statement
//! and argument lists are sorted by their `order` attributes during this
//! pass (orders are required to be distinct, so sorting here is equivalent
//! to sorting at execution time).

use roxmltree::{Document, Node};

use crate::{
    classes::ClassRegistry,
    error::{RunError, RunResult},
    expressions::{Assign, BlockId, BlockLit, Expr, Literal, Program},
};

/// Parses the XML source and validates the `Main`/`run` entry point.
pub(crate) fn parse(source: &str) -> RunResult<(Program, ClassRegistry)> {
    let document =
        Document::parse(source).map_err(|err| RunError::type_err(format!("malformed XML: {err}")))?;
    let root = document.root_element();
    if root.tag_name().name() != "program" {
        return Err(unexpected_element(root));
    }
    let language = require_attribute(root, "language")?;
    if !language.eq_ignore_ascii_case("SOL25") {
        return Err(RunError::type_err(format!("unsupported language '{language}'")));
    }

    let mut program = Program::default();
    let mut classes = ClassRegistry::new();
    for class_node in element_children(root) {
        if class_node.tag_name().name() != "class" {
            return Err(unexpected_element(class_node));
        }
        parse_class(class_node, &mut program, &mut classes)?;
    }
    classes.require_main(|block| program.block(block).arity())?;
    Ok((program, classes))
}

fn parse_class(node: Node<'_, '_>, program: &mut Program, classes: &mut ClassRegistry) -> RunResult<()> {
    let name = require_attribute(node, "name")?;
    let parent = require_attribute(node, "parent")?;
    let class = classes.add_class(name, parent)?;
    for method_node in element_children(node) {
        if method_node.tag_name().name() != "method" {
            return Err(unexpected_element(method_node));
        }
        let selector = require_attribute(method_node, "selector")?;
        let block_node = single_element_child(method_node, "block")?;
        let block = parse_block(block_node, program)?;
        classes.add_method(class, selector, block)?;
    }
    Ok(())
}

fn parse_block(node: Node<'_, '_>, program: &mut Program) -> RunResult<BlockId> {
    let arity: usize = require_attribute(node, "arity")?
        .parse()
        .map_err(|_| RunError::type_err("invalid block arity"))?;

    let mut parameters: Vec<(usize, String)> = Vec::new();
    let mut assigns: Vec<(usize, Assign)> = Vec::new();
    for child in element_children(node) {
        match child.tag_name().name() {
            "parameter" => {
                let name = require_attribute(child, "name")?.to_owned();
                parameters.push((parse_order(child)?, name));
            }
            "assign" => {
                let order = parse_order(child)?;
                let mut target = None;
                let mut expr = None;
                for part in element_children(child) {
                    match part.tag_name().name() {
                        "var" if target.is_none() => {
                            target = Some(require_attribute(part, "name")?.to_owned());
                        }
                        "expr" if expr.is_none() => expr = Some(parse_expr(part, program)?),
                        _ => return Err(unexpected_element(part)),
                    }
                }
                let (Some(target), Some(expr)) = (target, expr) else {
                    return Err(RunError::type_err("<assign> must contain one <var> and one <expr>"));
                };
                assigns.push((order, Assign { target, expr }));
            }
            _ => return Err(unexpected_element(child)),
        }
    }

    parameters.sort_by_key(|(order, _)| *order);
    if parameters.iter().enumerate().any(|(i, (order, _))| *order != i + 1) {
        return Err(RunError::type_err("parameter orders must be sequential from 1"));
    }
    if parameters.len() != arity {
        return Err(RunError::type_err(format!(
            "block arity {arity} disagrees with its {} parameter(s)",
            parameters.len()
        )));
    }
    assigns.sort_by_key(|(order, _)| *order);
    if assigns.windows(2).any(|pair| pair[0].0 == pair[1].0) {
        return Err(RunError::type_err("duplicate assign order"));
    }

    Ok(program.add_block(BlockLit {
        parameters: parameters.into_iter().map(|(_, name)| name).collect(),
        body: assigns.into_iter().map(|(_, assign)| assign).collect(),
    }))
}

fn parse_expr(node: Node<'_, '_>, program: &mut Program) -> RunResult<Expr> {
    let mut children = element_children(node);
    match (children.next(), children.next()) {
        (Some(inner), None) => parse_expr_inner(inner, program),
        _ => Err(RunError::type_err("<expr> must contain exactly one element")),
    }
}

fn parse_expr_inner(node: Node<'_, '_>, program: &mut Program) -> RunResult<Expr> {
    match node.tag_name().name() {
        "literal" => parse_literal(node).map(Expr::Literal),
        "var" => Ok(Expr::Var(require_attribute(node, "name")?.to_owned())),
        "send" => parse_send(node, program),
        "block" => parse_block(node, program).map(Expr::Block),
        _ => Err(unexpected_element(node)),
    }
}

fn parse_literal(node: Node<'_, '_>) -> RunResult<Literal> {
    let class = require_attribute(node, "class")?;
    match class {
        "Nil" => Ok(Literal::Nil),
        "True" => Ok(Literal::True),
        "False" => Ok(Literal::False),
        "Integer" => {
            let value = require_attribute(node, "value")?;
            value
                .parse()
                .map(Literal::Int)
                .map_err(|_| RunError::type_err(format!("invalid Integer literal '{value}'")))
        }
        "String" => Ok(Literal::Str(unescape(require_attribute(node, "value")?))),
        "class" => Ok(Literal::Class(require_attribute(node, "value")?.to_owned())),
        _ => Err(RunError::type_err(format!("unknown literal class '{class}'"))),
    }
}

fn parse_send(node: Node<'_, '_>, program: &mut Program) -> RunResult<Expr> {
    let selector = require_attribute(node, "selector")?.to_owned();
    let mut receiver = None;
    let mut args: Vec<(usize, Expr)> = Vec::new();
    for child in element_children(node) {
        match child.tag_name().name() {
            "expr" if receiver.is_none() => receiver = Some(parse_expr(child, program)?),
            "expr" => return Err(RunError::type_err("<send> has more than one receiver")),
            "arg" => {
                let order = parse_order(child)?;
                let inner = single_element_child(child, "expr")?;
                args.push((order, parse_expr(inner, program)?));
            }
            _ => return Err(unexpected_element(child)),
        }
    }
    let Some(receiver) = receiver else {
        return Err(RunError::type_err("<send> is missing its receiver <expr>"));
    };
    args.sort_by_key(|(order, _)| *order);
    if args.windows(2).any(|pair| pair[0].0 == pair[1].0) {
        return Err(RunError::type_err("duplicate arg order"));
    }
    Ok(Expr::Send {
        selector,
        receiver: Box::new(receiver),
        args: args.into_iter().map(|(_, expr)| expr).collect(),
    })
}

/// Applies the SOL25 string escapes in a single left-to-right pass.
/// Only `\n`, `\'`, and `\\` are recognized; any other backslash sequence
/// is kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

fn single_element_child<'a, 'input>(node: Node<'a, 'input>, expected: &str) -> RunResult<Node<'a, 'input>> {
    let mut children = element_children(node);
    match (children.next(), children.next()) {
        (Some(child), None) if child.tag_name().name() == expected => Ok(child),
        _ => Err(RunError::type_err(format!(
            "<{}> must contain exactly one <{expected}>",
            node.tag_name().name()
        ))),
    }
}

fn require_attribute<'a>(node: Node<'a, '_>, name: &str) -> RunResult<&'a str> {
    node.attribute(name).ok_or_else(|| {
        RunError::type_err(format!(
            "<{}> is missing the '{name}' attribute",
            node.tag_name().name()
        ))
    })
}

fn parse_order(node: Node<'_, '_>) -> RunResult<usize> {
    let order: usize = require_attribute(node, "order")?
        .parse()
        .map_err(|_| RunError::type_err("invalid order attribute"))?;
    if order == 0 {
        return Err(RunError::type_err("order attributes start at 1"));
    }
    Ok(order)
}

fn unexpected_element(node: Node<'_, '_>) -> RunError {
    RunError::type_err(format!("unexpected element <{}>", node.tag_name().name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_escapes_only() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"a\'b"), "a'b");
        assert_eq!(unescape(r"a\\b"), "a\\b");
        assert_eq!(unescape(r"a\tb"), "a\\tb");
        assert_eq!(unescape(r"trailing\"), "trailing\\");
    }

    #[test]
    fn escapes_apply_in_one_pass() {
        // The backslash produced by `\\` must not start a second escape.
        assert_eq!(unescape(r"\\n"), "\\n");
        assert_eq!(unescape(r"\\\n"), "\\\n");
    }
}
