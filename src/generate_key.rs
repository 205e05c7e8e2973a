// generate_key.rs
// Utility to generate a new JWT signing secret

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

fn generate_secret() -> String {
    let mut key = [0u8; 48];
    OsRng.fill_bytes(&mut key);
    URL_SAFE_NO_PAD.encode(key)
}

fn main() {
    println!("Generating new JWT signing secret...\n");

    let secret = generate_secret();

    println!("✅ Secret generated successfully!\n");
    println!("Add this to your .env file:");
    println!("─────────────────────────────────────────────────");
    println!("JWT_SECRET={}", secret);
    println!("─────────────────────────────────────────────────");
    println!("\n⚠️  IMPORTANT:");
    println!("  • Keep this secret out of version control");
    println!("  • Changing it invalidates every session token already issued");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_64_url_safe_chars() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(secret, generate_secret());
    }
}
