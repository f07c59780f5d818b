use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as BASE64};
use rand::RngCore;

/// Random bytes behind every upload token.
pub const UPLOAD_TOKEN_BYTES: usize = 32;

/// Generate a fresh random upload token.
pub fn generate_upload_token() -> String {
    let mut bytes = [0u8; UPLOAD_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    token_to_string(&bytes)
}

/// URL-safe encoding, so tokens can travel in query strings.
fn token_to_string(bytes: &[u8; UPLOAD_TOKEN_BYTES]) -> String {
    BASE64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique_and_url_safe() {
        let a = generate_upload_token();
        let b = generate_upload_token();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_encode_all_random_bytes() {
        // 32 bytes in unpadded base64
        assert_eq!(generate_upload_token().len(), 43);
        assert_eq!(token_to_string(&[0u8; UPLOAD_TOKEN_BYTES]), "A".repeat(43));
    }
}
