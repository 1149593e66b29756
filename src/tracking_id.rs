use rand::Rng;

pub const PREFIX: &str = "TRK";
pub const SUFFIX_LEN: usize = 9;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate an external tracking identifier: `TRK` plus nine uppercase
/// base-36 characters. Uniqueness is not checked here; the create path
/// retries on primary-key conflict instead of trusting the draw.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(PREFIX.len() + SUFFIX_LEN);
    id.push_str(PREFIX);
    for _ in 0..SUFFIX_LEN {
        let idx = rng.gen_range(0..ALPHABET.len());
        id.push(ALPHABET[idx] as char);
    }
    id
}
