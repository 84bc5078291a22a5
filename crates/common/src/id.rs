//! ID and token generation.

use ulid::Ulid;
use uuid::Uuid;

/// Generator for record IDs and access tokens.
///
/// Every stored row (users, recipes, ingredients, relation links) gets a
/// lowercase ULID as its primary key, so IDs created later always sort
/// after IDs created earlier.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a record ID: a 26-character lowercase ULID.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_ascii_lowercase()
    }

    /// Generate an access token: 32 hex characters with no time
    /// component, so a token leaks nothing about when it was issued.
    #[must_use]
    pub fn generate_token(&self) -> String {
        Uuid::new_v4().as_simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ids_are_lowercase_ulids() {
        let id_gen = IdGenerator::new();
        let a = id_gen.generate();
        let b = id_gen.generate();

        assert_eq!(a.len(), 26);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_ids_created_later_sort_after() {
        let id_gen = IdGenerator::new();
        let earlier = id_gen.generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = id_gen.generate();

        assert!(earlier < later);
    }

    #[test]
    fn test_tokens_are_hex_and_unguessable_length() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, id_gen.generate_token());
    }
}
