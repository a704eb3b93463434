use backend_lib::auth::{hash_password, validate_password_strength, verify_password, PasswordRequirements};

#[test]
fn test_password_hashing_and_verification() {
    let password = "SecureP@ssw0rd";
    let hash = hash_password(password, 8).unwrap();

    assert_ne!(password, hash);
    assert!(hash.starts_with("$scrypt$"));
    assert!(verify_password(&hash, password));
    assert!(!verify_password(&hash, "SecureP@ssw0rd!"));
}

#[test]
fn test_hashes_are_salted() {
    let first = hash_password("1234567", 8).unwrap();
    let second = hash_password("1234567", 8).unwrap();
    assert_ne!(first, second);
    assert!(verify_password(&first, "1234567"));
    assert!(verify_password(&second, "1234567"));
}

#[test]
fn test_malformed_hash_never_verifies() {
    assert!(!verify_password("", "anything"));
    assert!(!verify_password("not-a-phc-string", "not-a-phc-string"));
}

#[test]
fn test_password_strength_validation() {
    let requirements = PasswordRequirements::default();

    assert!(validate_password_strength("123456", &requirements));
    assert!(!validate_password_strength("12345", &requirements));
    // surrounding whitespace does not count towards the length
    assert!(!validate_password_strength("  12345  ", &requirements));

    let custom_requirements = PasswordRequirements {
        min_length: 10,
        ..PasswordRequirements::default()
    };
    assert!(!validate_password_strength("123456789", &custom_requirements));
    assert!(validate_password_strength("1234567890", &custom_requirements));
}
