use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PromoError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PromoError::invalid_schedule("x")
            .to_string()
            .contains("invalid schedule:")
    );
    assert!(
        PromoError::missing_asset("logo")
            .to_string()
            .contains("missing asset: logo")
    );
    assert!(PromoError::font("x").to_string().contains("font error:"));
    assert!(PromoError::render("x").to_string().contains("render error:"));
    assert!(
        PromoError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PromoError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
