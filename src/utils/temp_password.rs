//! Temporary password generation for newly provisioned accounts.

use rand::Rng;

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghjkmnpqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_";

const PASSWORD_LEN: usize = 16;

/// Generates a random one-time password for identity provider accounts.
///
/// The password is only used until the user's forced first-login change, but
/// it still has to pass typical provider password policies, so each character
/// class is guaranteed at least once. Ambiguous characters (I, l, 0, O, 1)
/// are excluded.
pub fn generate_temp_password() -> String {
    let mut rng = rand::rng();

    let mut chars: Vec<u8> = Vec::with_capacity(PASSWORD_LEN);

    // One from each class first, filler from the union afterwards.
    for class in [UPPER, LOWER, DIGITS, SYMBOLS] {
        chars.push(class[rng.random_range(0..class.len())]);
    }

    let all: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();
    while chars.len() < PASSWORD_LEN {
        chars.push(all[rng.random_range(0..all.len())]);
    }

    // Shuffle so the class-guaranteed characters are not positionally fixed.
    for i in (1..chars.len()).rev() {
        let j = rng.random_range(0..=i);
        chars.swap(i, j);
    }

    chars.into_iter().map(|b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(generate_temp_password().len(), PASSWORD_LEN);
    }

    #[test]
    fn test_contains_all_character_classes() {
        let password = generate_temp_password();

        assert!(password.bytes().any(|b| UPPER.contains(&b)));
        assert!(password.bytes().any(|b| LOWER.contains(&b)));
        assert!(password.bytes().any(|b| DIGITS.contains(&b)));
        assert!(password.bytes().any(|b| SYMBOLS.contains(&b)));
    }

    #[test]
    fn test_passwords_are_not_repeated() {
        let a = generate_temp_password();
        let b = generate_temp_password();
        assert_ne!(a, b);
    }
}
