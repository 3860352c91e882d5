use pretty_assertions::assert_eq;
use tess_ir::construct::{
    bool_t, bound, cart_prod, dom_proj, dom_t, enum_t, fin, int, int_t, lambda, lt, restrict,
    slice, tiles, tuple_t, universe, var, windows,
};
use tess_ir::{ErrorCode, StringInterner, VarId};

use super::*;

fn witness_of(d: &Node) -> Witness {
    let facts = DomainInference::run(d).unwrap();
    facts.witness(d).cloned().unwrap()
}

#[test]
fn fin_is_finite_and_ordered() {
    let w = witness_of(&fin(int(5)));
    assert!(w.is_finite);
    assert!(w.is_ordered);
    assert_eq!(w.decomposition, None);
}

#[test]
fn universe_is_finite_only_for_unit_and_enums() {
    let names = StringInterner::new();
    let color = enum_t(names.intern("Color"), [names.intern("Red"), names.intern("Blue")]);
    assert!(witness_of(&universe(color)).is_finite);
    assert!(!witness_of(&universe(int_t())).is_finite);
    assert!(!witness_of(&universe(int_t())).is_ordered);
    assert!(!witness_of(&universe(bool_t())).is_finite);
}

#[test]
fn product_of_finite_domains() {
    let d = cart_prod([fin(int(3)), fin(int(2))]);
    let w = witness_of(&d);
    assert!(w.is_finite);
    assert!(w.is_ordered);
    assert_eq!(w.decomposition.as_ref().map(|c| c.len()), Some(2));
    assert_eq!(cardinality(&d), Some(6));
}

#[test]
fn product_with_an_infinite_factor() {
    let d = cart_prod([fin(int(3)), universe(int_t())]);
    let w = witness_of(&d);
    assert!(!w.is_finite);
    assert_eq!(cardinality(&d), None);
}

#[test]
fn restriction_inherits() {
    let base = cart_prod([fin(int(3)), fin(int(2))]);
    let pairs = tuple_t([int_t(), int_t()]);
    let pred = lambda(None, pairs, lt(int(0), int(1)));
    let w = witness_of(&restrict(base, pred));
    assert!(w.is_finite);
    assert!(w.is_ordered);
    assert_eq!(w.decomposition.as_ref().map(|c| c.len()), Some(2));
}

#[test]
fn projection_takes_the_component_witness() {
    let d = cart_prod([fin(int(3)), universe(int_t())]);
    assert!(witness_of(&dom_proj(d.clone(), 0)).is_finite);
    assert!(!witness_of(&dom_proj(d, 1)).is_finite);
}

#[test]
fn projection_drops_the_component_decomposition() {
    let pairs = cart_prod([fin(int(2)), fin(int(2))]);
    let d = dom_proj(cart_prod([pairs, fin(int(3))]), 0);
    let w = witness_of(&d);
    assert!(w.is_finite && w.is_ordered);
    assert_eq!(w.decomposition, None);
}

#[test]
fn projection_needs_a_decomposition() {
    let pairs = var(VarId::new(0), dom_t(tuple_t([int_t(), int_t()]), Some(int(4))));
    let err = DomainInference::run(&dom_proj(pairs, 1)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
    assert!(err.to_string().contains("component #1"), "{err}");
}

#[test]
fn window_counts() {
    for (len, size, stride, expected) in [(6, 3, 1, 4), (7, 3, 2, 3), (5, 5, 1, 1)] {
        let d = windows(fin(int(len)), size, stride);
        let facts = DomainInference::run(&d).unwrap();
        let derived = facts.derived(&d).unwrap();
        assert_eq!(derived.to_string(), format!("(fin {expected})"));
        assert_eq!(cardinality(derived), Some(expected));
        assert!(facts.witness(derived).is_some_and(|w| w.is_finite && w.is_ordered));
    }
}

#[test]
fn slice_and_tile_counts() {
    let d = slice(fin(int(10)), 2, 7);
    let facts = DomainInference::run(&d).unwrap();
    assert_eq!(facts.derived(&d).map(ToString::to_string), Some("(fin 5)".to_owned()));

    let d = tiles(fin(int(12)), 4);
    let facts = DomainInference::run(&d).unwrap();
    assert_eq!(facts.derived(&d).map(ToString::to_string), Some("(fin 3)".to_owned()));
}

#[test]
fn windows_over_a_symbolic_length_stay_symbolic() {
    let n = var(VarId::new(0), int_t());
    let d = windows(fin(n), 2, 1);
    let facts = DomainInference::run(&d).unwrap();
    assert_eq!(
        facts.derived(&d).map(ToString::to_string),
        Some("(fin (sub $0 1))".to_owned())
    );
}

#[test]
fn windowing_requires_finite_and_ordered() {
    let err = DomainInference::run(&windows(universe(int_t()), 2, 1)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
    assert!(err.to_string().contains("finite"), "{err}");

    let names = StringInterner::new();
    let color = enum_t(names.intern("Color"), [names.intern("Red")]);
    let err = DomainInference::run(&tiles(universe(color), 1)).unwrap_err();
    assert!(err.to_string().contains("ordered"), "{err}");
}

#[test]
fn windowing_rejects_short_domains() {
    let err = DomainInference::run(&windows(fin(int(2)), 3, 1)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
    assert!(err.to_string().contains("at least 3 elements"), "{err}");

    let err = DomainInference::run(&slice(fin(int(4)), 1, 6)).unwrap_err();
    assert!(err.to_string().contains("at least 6 elements"), "{err}");
}

#[test]
fn windowing_rejects_nonpositive_parameters() {
    let err = DomainInference::run(&windows(fin(int(6)), 0, 1)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9001);
}

#[test]
fn symbolic_domains_are_judged_by_type() {
    let d = var(VarId::new(0), dom_t(int_t(), Some(int(3))));
    assert!(witness_of(&d).is_finite);
    let p = bound(0, dom_t(int_t(), None));
    let f = lambda(None, dom_t(int_t(), None), p.clone());
    let facts = DomainInference::run(&f).unwrap();
    assert!(facts.witness(&p).is_some_and(|w| !w.is_finite && w.is_ordered));
    assert!(facts.witness(&f).is_none());
}
