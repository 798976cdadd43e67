use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_when_unset() {
    let cfg = DiagramConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg, DiagramConfig::default());
    assert_eq!(cfg.create_concurrency, DEFAULT_CREATE_CONCURRENCY);
    assert_eq!(cfg.create_timeout, None);
    assert_eq!(cfg.layout, LayoutOverrides::default());
}

#[test]
fn parses_all_variables() {
    let cfg = DiagramConfig::from_lookup(lookup(&[
        ("DIAGRAM_CREATE_CONCURRENCY", "4"),
        ("DIAGRAM_CREATE_TIMEOUT_SECS", " 30 "),
        ("DIAGRAM_NODE_WIDTH", "200"),
        ("DIAGRAM_NODE_HEIGHT", "90.5"),
        ("DIAGRAM_SPACING_X", "40"),
        ("DIAGRAM_SPACING_Y", "0"),
    ]))
    .unwrap();
    assert_eq!(cfg.create_concurrency, 4);
    assert_eq!(cfg.create_timeout, Some(Duration::from_secs(30)));
    assert_eq!(cfg.layout.node_width, Some(200.0));
    assert_eq!(cfg.layout.node_height, Some(90.5));
    assert_eq!(cfg.layout.spacing_x, Some(40.0));
    assert_eq!(cfg.layout.spacing_y, Some(0.0));
    assert_eq!(cfg.layout.start_x, None);
}

#[test]
fn unparsable_values_fall_back() {
    let cfg = DiagramConfig::from_lookup(lookup(&[
        ("DIAGRAM_CREATE_CONCURRENCY", "many"),
        ("DIAGRAM_CREATE_TIMEOUT_SECS", "-5"),
        ("DIAGRAM_NODE_WIDTH", "wide"),
    ]))
    .unwrap();
    assert_eq!(cfg.create_concurrency, DEFAULT_CREATE_CONCURRENCY);
    assert_eq!(cfg.create_timeout, None);
    assert_eq!(cfg.layout.node_width, None);
}

#[test]
fn zero_concurrency_is_rejected() {
    let err = DiagramConfig::from_lookup(lookup(&[("DIAGRAM_CREATE_CONCURRENCY", "0")])).unwrap_err();
    assert_eq!(err, ConfigError::ZeroConcurrency { var: "DIAGRAM_CREATE_CONCURRENCY" });
    assert_eq!(err.error_code(), "E_CONFIG");
    assert!(err.to_string().contains("DIAGRAM_CREATE_CONCURRENCY"));
}

#[test]
fn zero_timeout_means_unbounded() {
    let cfg = DiagramConfig::from_lookup(lookup(&[("DIAGRAM_CREATE_TIMEOUT_SECS", "0")])).unwrap();
    assert_eq!(cfg.create_timeout, None);
}
