use pretty_assertions::assert_eq;

use super::*;

fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key: &str| vars.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v).to_owned())
}

#[test]
fn defaults() {
    let options = PipelineOptions::default();
    assert_eq!(options.max_iterations, DEFAULT_MAX_ITERATIONS);
    assert!(options.check_types);
    assert!(options.infer_domains);
    assert_eq!(options.validate, cfg!(debug_assertions));
}

#[test]
fn environment_overrides() {
    let options = PipelineOptions::from_lookup(lookup(&[
        ("TESS_MAX_ITERATIONS", "4"),
        ("TESS_VALIDATE", "off"),
    ]));
    assert_eq!(options.max_iterations, 4);
    assert!(!options.validate);
}

#[test]
fn invalid_values_keep_defaults() {
    let options = PipelineOptions::from_lookup(lookup(&[
        ("TESS_MAX_ITERATIONS", "zero"),
        ("TESS_VALIDATE", "maybe"),
    ]));
    assert_eq!(options, PipelineOptions::default());

    let options = PipelineOptions::from_lookup(lookup(&[("TESS_MAX_ITERATIONS", "0")]));
    assert_eq!(options.max_iterations, DEFAULT_MAX_ITERATIONS);
}

#[test]
fn builder_methods() {
    let options = PipelineOptions::default()
        .with_max_iterations(2)
        .with_type_check(false)
        .with_domain_inference(false)
        .with_validation(true);
    assert_eq!(
        options,
        PipelineOptions {
            max_iterations: 2,
            check_types: false,
            infer_domains: false,
            validate: true,
        }
    );
}
