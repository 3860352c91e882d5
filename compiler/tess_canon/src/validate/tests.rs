use pretty_assertions::assert_eq;
use tess_ir::construct::{add, bound, int, int_t, lambda, lambda_with, tuple, var};
use tess_ir::{BinderArena, ErrorCode, Kind, VarId};

use super::*;
use crate::cse;

fn x(id: u32) -> Node {
    var(VarId::new(id), int_t())
}

#[test]
fn accepts_cse_output() {
    let root = tuple([
        add([x(2), add([int(1), x(0)])]),
        lambda(None, int_t(), bound(0, int_t())),
    ]);
    let canonical = cse(&root).unwrap();
    validate(&canonical).unwrap();
}

#[test]
fn rejects_hoas() {
    let mut arena = BinderArena::new();
    let f = lambda_with(&mut arena, int_t(), |_, v| v);
    let err = validate(&f).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9002);
}

#[test]
fn rejects_open_terms() {
    let err = validate(&add([bound(0, int_t()), int(1)])).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9002);
}

#[test]
fn rejects_nested_ac_operands() {
    let root = add([int(1), add([x(0), x(1)])]);
    let err = validate(&root).unwrap_err();
    assert!(err.to_string().contains("not flattened"), "{err}");
}

#[test]
fn rejects_unsorted_ac_operands() {
    let canonical = cse(&add([x(0), x(1)])).unwrap();
    let reversed: Vec<Node> = canonical.children().iter().rev().cloned().collect();
    let unsorted = Node::new(Kind::Add, [], reversed, canonical.ty().cloned());
    let err = validate(&unsorted).unwrap_err();
    assert!(err.to_string().contains("not sorted"), "{err}");
}
