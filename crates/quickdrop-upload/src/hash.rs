//! Random filename hash segment.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng, TryRngCore};

pub const HASH_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of 36 that fits in a byte; bytes at or above it are
/// redrawn so every character is equally likely.
const REJECTION_BOUND: u8 = 252;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `length` characters from `[a-z0-9]`, drawn from the OS CSPRNG.
///
/// When the OS source fails, falls back to a PRNG seeded from the clock and a
/// process-wide counter: still unique per call, no longer unpredictable.
pub fn generate_hash(length: usize) -> String {
    match os_hash(length) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!(error = %e, "OS random source unavailable, using seeded fallback");
            fallback_hash(length)
        }
    }
}

fn os_hash(length: usize) -> Result<String, String> {
    let mut hash = String::with_capacity(length);
    let mut buf = [0u8; 32];

    while hash.len() < length {
        OsRng.try_fill_bytes(&mut buf).map_err(|e| e.to_string())?;
        for byte in buf {
            if hash.len() == length {
                break;
            }
            if byte < REJECTION_BOUND {
                hash.push(HASH_ALPHABET[(byte % 36) as usize] as char);
            }
        }
    }

    Ok(hash)
}

fn fallback_hash(length: usize) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let count = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut rng = StdRng::seed_from_u64(nanos ^ count.rotate_left(32));

    (0..length)
        .map(|_| HASH_ALPHABET[rng.random_range(0..HASH_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hash_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit()
    }

    #[test]
    fn test_length_and_alphabet() {
        for length in [4, 8, 16] {
            let hash = generate_hash(length);
            assert_eq!(hash.len(), length);
            assert!(hash.chars().all(is_hash_char), "{}", hash);
        }
    }

    #[test]
    fn test_fallback_length_and_alphabet() {
        let hash = fallback_hash(12);
        assert_eq!(hash.len(), 12);
        assert!(hash.chars().all(is_hash_char));
    }

    #[test]
    fn test_fallback_calls_differ() {
        assert_ne!(fallback_hash(16), fallback_hash(16));
    }

    #[test]
    fn test_hashes_differ() {
        assert_ne!(generate_hash(16), generate_hash(16));
    }
}
