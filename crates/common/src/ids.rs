//! Identifier and credential generation.

use rand::Rng;

/// Generates an identifier of the form `{prefix}_{unix_millis}_{1000..=9999}`.
pub fn generate_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format!("{prefix}_{millis}_{suffix}")
}

/// Generates a 64-character lowercase hex credential from 32 random bytes.
pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_timestamp_and_suffix() {
        let id = generate_id("SELLER");
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "SELLER");
        assert!(parts[1].parse::<i64>().is_ok());
        let suffix: u16 = parts[2].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
    }

    #[test]
    fn prefix_may_contain_underscores() {
        let id = generate_id("KK_SEL");
        assert!(id.starts_with("KK_SEL_"));
    }

    #[test]
    fn api_key_is_64_hex_chars() {
        let key = generate_api_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(key, generate_api_key());
    }
}
