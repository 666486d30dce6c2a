use medhanit::{MedhanitError, Result};

#[test]
fn test_error_display() {
    let err = MedhanitError::Api {
        status: 503,
        message: "overloaded".to_string(),
    };
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("overloaded"));
}

#[test]
fn test_invalid_input() {
    let err = MedhanitError::InvalidInput("empty query".to_string());
    assert!(err.to_string().contains("empty query"));
}

#[test]
fn test_json_error_conversion() {
    let parse_err = serde_json::from_str::<u32>("not a number").unwrap_err();
    let err: MedhanitError = parse_err.into();
    assert!(matches!(err, MedhanitError::Json(_)));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(MedhanitError::NoProvider)
    }
    assert!(returns_error().is_err());
    assert!(
        returns_error()
            .unwrap_err()
            .to_string()
            .contains("no provider")
    );
}
