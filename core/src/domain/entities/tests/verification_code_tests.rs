//! Unit tests for verification code primitives

use crate::domain::entities::verification_code::{
    generate_code, is_well_formed, CodeIdentity, CODE_LENGTH,
};

#[test]
fn test_generated_codes_are_six_digits() {
    for _ in 0..1000 {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(is_well_formed(&code));

        let value: u32 = code.parse().unwrap();
        assert!((100_000..=999_999).contains(&value));
    }
}

#[test]
fn test_is_well_formed() {
    assert!(is_well_formed("482913"));
    assert!(!is_well_formed("48291"));
    assert!(!is_well_formed("4829130"));
    assert!(!is_well_formed("48291a"));
    assert!(!is_well_formed("４８２９１３"));
}

#[test]
fn test_identity_key_and_mask() {
    let identity = CodeIdentity::new("alice@example.com", "user_abc");
    assert_eq!(identity.key(), "alice@example.com:user_abc");
    assert_eq!(identity.masked_email(), "a***@example.com");

    let odd = CodeIdentity::new("not-an-email", "u");
    assert_eq!(odd.masked_email(), "***");
}
