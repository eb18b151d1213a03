use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Random url-safe string carrying at least `bits` bits of entropy.
pub fn create_random_string(bits: usize) -> String {
    let mut bytes = vec![0u8; bits.div_ceil(8)];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
