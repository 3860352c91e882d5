use pretty_assertions::assert_eq;
use tess_ir::ErrorCode;

use super::*;

#[derive(Debug, PartialEq)]
struct Limits(u32);

#[derive(Debug, PartialEq)]
struct Labels(Vec<&'static str>);

#[test]
fn add_then_get() {
    let mut ctx = Context::new();
    ctx.add(Limits(3)).unwrap();
    ctx.add(Labels(vec!["a"])).unwrap();
    assert_eq!(ctx.get::<Limits>().unwrap(), &Limits(3));
    assert_eq!(ctx.try_get::<Labels>(), Some(&Labels(vec!["a"])));
    assert_eq!(ctx.len(), 2);
}

#[test]
fn get_missing_kind_is_missing_dependency() {
    let ctx = Context::new();
    let err = ctx.get::<Limits>().unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9003);
    assert!(err.to_string().contains("`Limits`"), "{err}");
    assert!(ctx.try_get::<Limits>().is_none());
}

#[test]
fn adding_a_kind_twice_is_an_error() {
    let mut ctx = Context::new();
    ctx.add(Limits(1)).unwrap();
    let err = ctx.add(Limits(2)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9002);
    assert_eq!(ctx.get::<Limits>().unwrap(), &Limits(1));
}

#[test]
fn insert_replaces_and_returns_previous() {
    let mut ctx = Context::new();
    assert_eq!(ctx.insert(Limits(1)), None);
    assert_eq!(ctx.insert(Limits(2)), Some(Limits(1)));
    assert_eq!(ctx.get::<Limits>().unwrap(), &Limits(2));
}

#[test]
fn contains_and_remove() {
    let mut ctx = Context::new();
    ctx.add(Limits(5)).unwrap();
    assert!(ctx.contains(FactKind::of::<Limits>()));
    assert!(!ctx.contains(FactKind::of::<Labels>()));
    assert_eq!(ctx.remove::<Limits>(), Some(Limits(5)));
    assert!(ctx.is_empty());
}
