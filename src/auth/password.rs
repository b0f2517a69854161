//! PBKDF2-HMAC-SHA256 password hashes, stored as
//! `pbkdf2_sha256$<iterations>$<salt>$<hex digest>`.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use uuid::Uuid;

const SCHEME: &str = "pbkdf2_sha256";
const ITERATIONS: u32 = 600_000;
const KEY_LEN: usize = 32;

/// Well-formed hash at full cost that no password matches, for checking
/// against when the account does not exist.
pub const UNUSABLE_HASH: &str = concat!(
    "pbkdf2_sha256$600000$00000000000000000000000000000000$",
    "0000000000000000000000000000000000000000000000000000000000000000",
);

pub fn hash_password(password: &str) -> String {
    encode(password, &Uuid::new_v4().simple().to_string(), ITERATIONS)
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(4, '$');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(iterations), Some(salt), Some(_)) => {
            match iterations.parse::<u32>() {
                Ok(n) if n > 0 => {
                    constant_time_eq(encode(password, salt, n).as_bytes(), stored.as_bytes())
                }
                _ => false,
            }
        }
        _ => false,
    }
}

fn encode(password: &str, salt: &str, iterations: u32) -> String {
    let key = derive(password, salt, iterations);
    format!("{SCHEME}${iterations}${salt}${}", hex::encode(key))
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
