use tess_ir::construct::{add, apply_t, bool_t, bound, dom_t, int, int_t, mul, pi_t, tuple_t};

use super::*;

#[test]
fn syntactically_equal_types() {
    assert!(types_equal(&tuple_t([int_t(), bool_t()]), &tuple_t([int_t(), bool_t()])).unwrap());
    assert!(!types_equal(&tuple_t([int_t(), bool_t()]), &tuple_t([bool_t(), int_t()])).unwrap());
}

#[test]
fn cardinalities_compare_by_value() {
    let a = dom_t(int_t(), Some(add([int(2), int(4)])));
    let b = dom_t(int_t(), Some(mul([int(3), int(2)])));
    assert!(types_equal(&a, &b).unwrap());
    assert!(!types_equal(&a, &dom_t(int_t(), Some(int(7)))).unwrap());
    assert!(!types_equal(&a, &dom_t(int_t(), None)).unwrap());
}

#[test]
fn type_application_reduces_before_comparison() {
    let family = pi_t(None, int_t(), dom_t(int_t(), Some(add([bound(0, int_t()), int(1)]))));
    let applied = apply_t(family, int(4));
    assert!(types_equal(&applied, &dom_t(int_t(), Some(int(5)))).unwrap());
}
