use bumpalo::Bump;
use pretty_assertions::assert_eq;

use crate::parser::{Node, NodeKind, normalize, parse};

/// Flatten a subtree into `Kind(text)` strings, depth first.
fn kinds(node: &Node) -> Vec<NodeKind> {
    let mut out = vec![node.kind];
    for child in node.children {
        out.extend(kinds(child));
    }
    out
}

fn first_statement<'a>(root: &'a Node<'a>) -> &'a Node<'a> {
    let instruction = &root.children[0];
    assert_eq!(instruction.kind, NodeKind::Instruction);
    &instruction.children[0]
}

#[test]
fn test_normalize_keeps_string_case() {
    assert_eq!(
        normalize("PRINT \"Hello World\" AT (1,2)."),
        "print \"Hello World\" at (1,2)."
    );
}

#[test]
fn test_empty_program() {
    let arena = Bump::new();
    let tree = parse(&arena, "").unwrap();
    assert_eq!(tree.root.kind, NodeKind::Start);
    assert!(tree.root.children.is_empty());
}

#[test]
fn test_set_statement_shape() {
    let arena = Bump::new();
    let tree = parse(&arena, "SET X TO 1 + 2 * 3.").unwrap();
    let set = first_statement(tree.root);
    assert_eq!(set.kind, NodeKind::SetStmt);
    assert_eq!(set.children.len(), 2);
    assert_eq!(set.children[0].kind, NodeKind::VarIdentifier);
    assert_eq!(set.children[0].text, "x");
    assert_eq!(set.children[1].kind, NodeKind::Expr);
    assert_eq!(set.children[1].text, "1 + 2 * 3");
}

#[test]
fn test_expression_chain_levels() {
    let arena = Bump::new();
    let tree = parse(&arena, "set x to 1 + 2.").unwrap();
    let expr = &first_statement(tree.root).children[1];
    let arith = &expr.children[0].children[0].children[0].children[0];
    assert_eq!(arith.kind, NodeKind::ArithExpr);
    let child_kinds: Vec<_> = arith.children.iter().map(|n| n.kind).collect();
    assert_eq!(
        child_kinds,
        vec![NodeKind::MultExpr, NodeKind::PlusMinus, NodeKind::MultExpr]
    );
}

#[test]
fn test_signed_atom() {
    let arena = Bump::new();
    let tree = parse(&arena, "set x to -y.").unwrap();
    let all = kinds(tree.root);
    assert!(all.contains(&NodeKind::PlusMinus));
    let atom = all.iter().position(|k| *k == NodeKind::Atom).unwrap();
    assert_eq!(all[atom + 1], NodeKind::PlusMinus);
}

#[test]
fn test_suffixes_and_call() {
    let arena = Bump::new();
    let tree = parse(&arena, "print ship:velocity:surface. print round(x, 2).").unwrap();
    let var = &first_statement(tree.root).children[0].children[0].children[0].children[0]
        .children[0]
        .children[0]
        .children[0]
        .children[0]
        .children[0];
    assert_eq!(var.kind, NodeKind::VarIdentifier);
    let names: Vec<_> = var.children.iter().map(|n| n.text).collect();
    assert_eq!(names, vec!["ship", "velocity", "surface"]);

    let second = &tree.root.children[1].children[0];
    assert!(kinds(second).contains(&NodeKind::ArgList));
}

#[test]
fn test_statement_offsets() {
    let arena = Bump::new();
    let tree = parse(&arena, "print 1.\nwhen x then print 2.").unwrap();
    let when = &tree.root.children[1].children[0];
    assert_eq!(when.kind, NodeKind::WhenStmt);
    assert_eq!(when.start(), 9);
}

#[test]
fn test_wait_until_marker() {
    let arena = Bump::new();
    let tree = parse(&arena, "wait until x. wait 5.").unwrap();
    let until = &tree.root.children[0].children[0];
    assert!(until.has(NodeKind::Until));
    let time = &tree.root.children[1].children[0];
    assert!(!time.has(NodeKind::Until));
}

#[test]
fn test_block_nesting() {
    let arena = Bump::new();
    let tree = parse(&arena, "until false { if x { break. } }").unwrap();
    let until = first_statement(tree.root);
    assert_eq!(until.kind, NodeKind::UntilStmt);
    let body = &until.children[1];
    assert_eq!(body.kind, NodeKind::Instruction);
    assert_eq!(body.children[0].kind, NodeKind::InstructionBlock);
}

#[test]
fn test_keywords_are_not_identifiers() {
    let arena = Bump::new();
    assert!(parse(&arena, "set to to 1.").is_err());
}

#[test]
fn test_syntax_error_position() {
    let arena = Bump::new();
    let err = parse(&arena, "print 1.\nset x 2.").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.snippet, "set x 2.");
    assert!(err.caret_snippet().ends_with('^'));
}

#[test]
fn test_keyword_needs_word_boundary() {
    let arena = Bump::new();
    let tree = parse(&arena, "set settings to 1. print toggled.").unwrap();
    let set = first_statement(tree.root);
    assert_eq!(set.kind, NodeKind::SetStmt);
    assert_eq!(set.children[0].text, "settings");
    assert!(parse(&arena, "setx to 1.").is_err());
}

#[test]
fn test_node_text_excludes_trailing_trivia() {
    let arena = Bump::new();
    let tree = parse(&arena, "on ag1 { print 1. }").unwrap();
    let on = first_statement(tree.root);
    assert_eq!(on.children[0].kind, NodeKind::VarIdentifier);
    assert_eq!(on.children[0].text, "ag1");
    assert_eq!(on.children[0].span.0, 3..6);

    let tree = parse(&arena, "set x to y // note\n  .").unwrap();
    let set = first_statement(tree.root);
    assert_eq!(set.children[1].text, "y");
    assert_eq!(set.children[0].text, "x");
}
