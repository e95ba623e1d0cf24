use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 over `order_id|payment_id`, the checkout's signature format.
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
    let digest = mac.finalize().into_bytes();
    Some(hex::encode(digest))
}

pub fn verify(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        debug!("Checkout signature is not valid hex");
        return false;
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_pair_verifies() {
        let signature = sign("order_abc123", "pay_xyz", "secret").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(verify("order_abc123", "pay_xyz", &signature, "secret"));
    }

    #[test]
    fn tampered_inputs_fail() {
        let signature = sign("order_abc123", "pay_xyz", "secret").unwrap();
        assert!(!verify("order_abc123", "pay_other", &signature, "secret"));
        assert!(!verify("order_abc123", "pay_xyz", &signature, "other-secret"));
        assert!(!verify("order_abc123", "pay_xyz", "zz", "secret"));
        assert!(!verify("order_abc123", "pay_xyz", "abc", "secret"));
    }
}
