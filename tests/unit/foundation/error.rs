use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(LottieError::parse("x").to_string().contains("parse error:"));
    assert!(LottieError::io("x").to_string().contains("io error:"));
    assert!(
        LottieError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LottieError::render("x").to_string().contains("render error:"));
    assert!(LottieError::RenderBusy.to_string().contains("in flight"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LottieError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_parse() {
    let err: LottieError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, LottieError::Parse(_)));
}
