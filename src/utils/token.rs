use rand::rngs::OsRng;
use rand::RngCore;

/// A share token is 128 random bits, hex encoded. The token itself is the
/// capability; guessing one is as hard as guessing the bits.
pub fn generate_share_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
