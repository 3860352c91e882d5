use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tess_ir::construct::{add, bound, fin, int, int_t, lambda};

use super::*;

#[test]
fn shifts_free_index() {
    assert_eq!(shift(&bound(0, int_t()), 2, 0).to_string(), "#2");
}

#[test]
fn binder_raises_cutoff() {
    let f = lambda(None, int_t(), add([bound(0, int_t()), bound(1, int_t())]));
    assert_eq!(shift(&f, 1, 0).to_string(), "(lambda :_ int (add #0 #2))");
}

#[test]
fn indices_below_cutoff_are_untouched() {
    let x = bound(0, int_t());
    assert!(Node::ptr_eq(&shift(&x, 1, 1), &x));
}

#[test]
fn closed_terms_keep_identity() {
    let f = lambda(None, int_t(), add([bound(0, int_t()), int(1)]));
    assert!(Node::ptr_eq(&shift(&f, 3, 0), &f));
}

#[test]
fn types_are_shifted_too() {
    let dom_ty = fin(bound(1, int_t())).ty().unwrap().clone();
    let x = bound(0, dom_ty);
    let shifted = shift(&x, 1, 0);
    assert_eq!(shifted.to_string(), "#1");
    assert_eq!(shifted.ty().unwrap().to_string(), "(domain-type int #2)");
}

#[test]
fn type_index_is_shifted_even_below_own_cutoff() {
    let dom_ty = fin(bound(2, int_t())).ty().unwrap().clone();
    let x = bound(0, dom_ty);
    let shifted = shift(&x, 1, 1);
    assert_eq!(shifted.to_string(), "#0");
    assert_eq!(shifted.ty().unwrap().to_string(), "(domain-type int #3)");
}

#[test]
#[should_panic(expected = "invalid index")]
fn shifting_below_zero_panics() {
    let _ = shift(&bound(0, int_t()), -1, 0);
}

#[derive(Clone, Debug)]
enum Shape {
    Lit(i64),
    Bound(u32),
    Add(Vec<Shape>),
    Lam(Box<Shape>),
}

fn build(shape: &Shape) -> Node {
    match shape {
        Shape::Lit(n) => int(*n),
        Shape::Bound(k) => bound(*k, int_t()),
        Shape::Add(items) => add(items.iter().map(build)),
        Shape::Lam(body) => lambda(None, int_t(), build(body)),
    }
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![(-5i64..5).prop_map(Shape::Lit), (0u32..3).prop_map(Shape::Bound)];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Shape::Add),
            inner.prop_map(|s| Shape::Lam(Box::new(s))),
        ]
    })
}

proptest! {
    #[test]
    fn shift_up_then_down_is_identity(s in shape()) {
        let t = build(&s);
        let round_trip = shift(&shift(&t, 1, 0), -1, 0);
        prop_assert_eq!(round_trip.key(), t.key());
    }

    #[test]
    fn shift_preserves_closedness(s in shape(), d in 0i64..4) {
        let t = build(&s);
        let shifted = shift(&t, d, 0);
        prop_assert_eq!(shifted.is_closed(), t.is_closed());
        if t.is_closed() {
            prop_assert!(Node::ptr_eq(&shifted, &t));
        }
    }
}
