use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LoopError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LoopError::surface("x").to_string().contains("surface error:"));
    assert!(LoopError::config("x").to_string().contains("config error:"));
    assert!(
        LoopError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LoopError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: LoopError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, LoopError::Serde(_)));
}
