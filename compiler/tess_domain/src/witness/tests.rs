use pretty_assertions::assert_eq;
use tess_ir::construct::{bool_t, dom_t, fin, int, int_t, tuple_t, universe, var};
use tess_ir::VarId;

use super::*;

#[test]
fn from_type_of_a_symbolic_domain() {
    let bounded = var(VarId::new(0), dom_t(int_t(), Some(int(9))));
    assert_eq!(Witness::from_type(&bounded), Some(Witness::finite_ordered()));

    let pairs = var(VarId::new(1), dom_t(tuple_t([int_t(), int_t()]), None));
    let witness = Witness::from_type(&pairs).unwrap();
    assert!(!witness.is_finite);
    assert!(!witness.is_ordered);
}

#[test]
fn from_type_of_a_non_domain() {
    assert_eq!(Witness::from_type(&int(3)), None);
    assert_eq!(Witness::from_type(&universe(bool_t())).map(|w| w.is_finite), Some(false));
}

#[test]
fn components() {
    let witness = Witness {
        decomposition: Some([fin(int(2)), fin(int(3))].into_iter().collect()),
        ..Witness::finite_ordered()
    };
    assert_eq!(witness.component(1), Some(&fin(int(3))));
    assert_eq!(witness.component(2), None);
    assert_eq!(Witness::finite_ordered().component(0), None);
}
