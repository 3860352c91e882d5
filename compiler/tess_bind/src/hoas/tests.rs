use tess_ir::construct::{add, bound, int, int_t, lambda_with};
use tess_ir::{BinderArena, ErrorCode, Kind};

use super::*;
use crate::resolve_bindings;

#[test]
fn resolved_term_passes() {
    let mut arena = BinderArena::new();
    let f = lambda_with(&mut arena, int_t(), |_, x| add([x, int(1)]));
    let resolved = resolve_bindings(&f).unwrap();
    assert!(ensure_resolved(&resolved).is_ok());
}

#[test]
fn surviving_hoas_node_is_internal_error() {
    let mut arena = BinderArena::new();
    let f = lambda_with(&mut arena, int_t(), |_, x| add([x, int(1)]));
    let err = ensure_resolved(&f).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9002);
    assert_eq!(err.nodes()[0].kind(), Kind::Lambda);
}

#[test]
fn first_hoas_finds_placeholders_in_pre_order() {
    let mut arena = BinderArena::new();
    let x = arena.fresh();
    let term = add([int(1), tess_ir::construct::placeholder(x, int_t())]);
    assert_eq!(first_hoas(&term).map(|n| n.kind()), Some(Kind::Placeholder));
    assert!(first_hoas(&int(1)).is_none());
}

#[test]
fn dangling_index_is_internal_error() {
    let err = ensure_resolved(&add([bound(2, int_t()), int(1)])).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9002);
    assert!(err.to_string().contains("index 2 escapes"), "{err}");
}
