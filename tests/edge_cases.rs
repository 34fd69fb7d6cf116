use std::io::Write as _;

use unmarshal_filter::{
    FilterBuilder, FilterChain, FilterError, InvalidReason, Limit, Query, Rule, Status,
};

#[test]
fn single_element_chain() {
    let chain = FilterChain::compile("com.a.X").unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.evaluate(&Query::new().class("com.a.X")), Status::Allow);
}

#[test]
fn ten_thousand_exact_classes_collapse_into_one_rule() {
    let spec = (0..10_000)
        .map(|i| format!("com.big.C{i}"))
        .collect::<Vec<_>>()
        .join(";");
    let chain = FilterChain::compile(&spec).unwrap();

    assert_eq!(chain.len(), 1);
    assert_eq!(chain.evaluate(&Query::new().class("com.big.C0")), Status::Allow);
    assert_eq!(chain.evaluate(&Query::new().class("com.big.C9999")), Status::Allow);
    assert_eq!(
        chain.evaluate(&Query::new().class("com.big.C10000")),
        Status::Undecided
    );
}

#[test]
fn duplicate_exact_elements_are_harmless() {
    let chain = FilterChain::compile("a.B;a.B;!a.B").unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.to_string(), "a.B;!a.B");
    assert_eq!(chain.evaluate(&Query::new().class("a.B")), Status::Allow);
}

#[test]
fn largest_limit_value() {
    let chain = FilterChain::compile(&format!("maxbytes={}", i64::MAX)).unwrap();
    assert_eq!(chain.evaluate(&Query::new().stream_bytes(u64::MAX)), Status::Reject);
    assert_eq!(
        chain.evaluate(&Query::new().stream_bytes(i64::MAX as u64)),
        Status::Undecided
    );
}

#[test]
fn overflowing_limit_value_is_malformed() {
    let err = FilterChain::compile("maxbytes=99999999999999999999").unwrap_err();
    assert_eq!(err.reason(), &InvalidReason::MalformedLimitValue);
}

#[test]
fn zero_limits() {
    let chain = FilterChain::compile("maxarray=0;maxrefs=0").unwrap();
    assert_eq!(chain.evaluate(&Query::new().array_length(0)), Status::Undecided);
    assert_eq!(chain.evaluate(&Query::new().array_length(1)), Status::Reject);
    assert_eq!(chain.evaluate(&Query::new().references(1)), Status::Reject);
}

#[test]
fn limit_value_splits_at_first_equals() {
    let err = FilterChain::compile("maxdepth==3").unwrap_err();
    assert_eq!(err.reason(), &InvalidReason::MalformedLimitValue);
}

#[test]
fn repeated_limit_first_one_decides_first() {
    let chain = FilterChain::compile("maxdepth=10;maxdepth=2").unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.evaluate(&Query::new().depth(5)), Status::Reject);
    let report = chain.explain(&Query::new().depth(5));
    assert_eq!(report.decided_by(), Some((1, "maxdepth=2")));
}

#[test]
fn double_negation_is_a_literal_class() {
    // Only one '!' is stripped; the rest belongs to the class name.
    let chain = FilterChain::compile("!!a.B").unwrap();
    assert_eq!(chain.evaluate(&Query::new().class("!a.B")), Status::Reject);
    assert_eq!(chain.evaluate(&Query::new().class("a.B")), Status::Undecided);
}

#[test]
fn non_ascii_class_names() {
    let chain = FilterChain::compile("com.例え.*;!com.ünï.**").unwrap();
    assert_eq!(chain.evaluate(&Query::new().class("com.例え.Klasse")), Status::Allow);
    assert_eq!(chain.evaluate(&Query::new().class("com.ünï.x.Y")), Status::Reject);
}

#[test]
fn package_boundary_uses_last_dot() {
    let chain = FilterChain::compile("com.example.*").unwrap();
    assert_eq!(
        chain.evaluate(&Query::new().class("com.example.")),
        Status::Allow
    );
    assert_eq!(
        chain.evaluate(&Query::new().class("com.example")),
        Status::Undecided
    );
}

#[test]
fn counters_at_maximum() {
    let chain = FilterChain::compile("maxdepth=1;*").unwrap();
    let q = Query::new()
        .class("x")
        .depth(u64::MAX)
        .references(u64::MAX)
        .stream_bytes(u64::MAX);
    assert_eq!(chain.evaluate(&q), Status::Reject);
}

#[test]
fn builder_refuses_element_with_separator() {
    let err = FilterBuilder::new().element("a.B;c.D").compile().unwrap_err();
    assert_eq!(err.reason(), &InvalidReason::EmbeddedSeparator);
    assert_eq!(err.element(), "a.B;c.D");
}

#[test]
fn builder_chain_survives_canonical_round_trip() {
    let chain = FilterBuilder::new()
        .allow("")
        .deny("x.Y")
        .element("a.*")
        .compile()
        .unwrap();
    let again = FilterChain::compile(&chain.to_string()).unwrap();
    assert_eq!(again, chain);
    assert_eq!(again.evaluate(&Query::new()), Status::Allow);
}

#[test]
fn builder_limits_render_canonically() {
    let chain = FilterBuilder::new()
        .limit(Limit::MaxArray, 64)
        .compile()
        .unwrap();
    assert_eq!(
        chain.rules(),
        &[Rule::Limit {
            limit: Limit::MaxArray,
            max: 64
        }]
    );
    assert_eq!(chain.to_string(), "maxarray=64");
}

// -- Configuration sources --
// Set and invalid variables are covered next to `from_env` itself, so no test
// here mutates the process environment.

#[test]
fn from_env_missing_variable() {
    let err = FilterChain::from_env("UNMARSHAL_FILTER_TEST_DEFINITELY_UNSET").unwrap_err();
    match err {
        FilterError::Spec(spec) => {
            assert_eq!(spec.reason(), &InvalidReason::Missing);
            assert_eq!(spec.element(), "UNMARSHAL_FILTER_TEST_DEFINITELY_UNSET");
        }
        other => panic!("expected Spec error, got {other:?}"),
    }
}

#[test]
fn from_file_strips_line_terminator() {
    let path = std::env::temp_dir().join(format!(
        "unmarshal-filter-{}-from-file.txt",
        std::process::id()
    ));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "!java.lang.Runtime;java.lang.*\r").unwrap();
    drop(file);

    let chain = FilterChain::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(chain.to_string(), "!java.lang.Runtime;java.lang.*");
    assert_eq!(
        chain.evaluate(&Query::new().class("java.lang.Runtime")),
        Status::Reject
    );
}

#[test]
fn from_file_missing_is_io_error() {
    let err = FilterChain::from_file("/nonexistent/unmarshal-filter/spec.txt").unwrap_err();
    assert!(matches!(err, FilterError::Io(_)));
}
