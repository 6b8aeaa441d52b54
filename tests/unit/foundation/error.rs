use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(PlaybackError::input("x").to_string().contains("input error:"));
    assert!(PlaybackError::not_found("x").to_string().contains("not found:"));
    assert!(
        PlaybackError::unsupported("x")
            .to_string()
            .contains("unsupported environment:")
    );
    assert!(PlaybackError::capture("x").to_string().contains("capture error:"));
    assert!(PlaybackError::encode("x").to_string().contains("encode error:"));
    assert!(
        PlaybackError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PlaybackError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_fetch_side_errors_are_user_facing() {
    assert!(PlaybackError::input("x").is_user_facing());
    assert!(PlaybackError::not_found("x").is_user_facing());
    assert!(PlaybackError::unsupported("x").is_user_facing());
    assert!(!PlaybackError::capture("x").is_user_facing());
    assert!(!PlaybackError::encode("x").is_user_facing());
}
