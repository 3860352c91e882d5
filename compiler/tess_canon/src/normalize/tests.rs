use pretty_assertions::assert_eq;
use tess_bind::apply;
use tess_ir::construct::{add, apply_t, bound, dom_t, int, int_t, lambda, mul, pi_t};

use super::*;

#[test]
fn reduces_and_folds() {
    let inc = lambda(None, int_t(), add([bound(0, int_t()), int(1)]));
    assert_eq!(normalize(&apply(inc, int(5))).unwrap().to_string(), "6");
}

#[test]
fn equal_dependent_types_share_a_key() {
    // (Π n. Dom(int, n * 2)) 3  and  Dom(int, 6)
    let family = pi_t(
        None,
        int_t(),
        dom_t(int_t(), Some(mul([bound(0, int_t()), int(2)]))),
    );
    let applied = normalize(&apply_t(family, int(3))).unwrap();
    let direct = normalize(&dom_t(int_t(), Some(int(6)))).unwrap();
    assert_eq!(applied.key(), direct.key());
}

#[test]
fn normal_forms_are_stable() {
    let term = add([int(1), add([int(2), int(3)])]);
    let once = normalize(&term).unwrap();
    assert!(Node::ptr_eq(&normalize(&once).unwrap(), &once));
}
