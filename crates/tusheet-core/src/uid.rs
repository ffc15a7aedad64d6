//! Client-side uid generation.
//!
//! A uid is a random base-36 fragment followed by the current Unix time in
//! milliseconds, also base 36. The time component makes collisions across
//! seconds impossible and the random fragment covers concurrent generation
//! within the same millisecond.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random fragment. Gives 36^11 (~= 2^56) possibilities per
/// millisecond.
const RANDOM_LEN: usize = 11;

/// Generates a new task uid.
pub fn generate_uid() -> String {
    let mut rng = rand::rng();
    let mut uid: String = (0..RANDOM_LEN)
        .map(|_| BASE36[rng.random_range(0..36)] as char)
        .collect();

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    uid.push_str(&to_base36(millis));
    uid
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 digits are ascii")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_is_non_empty_and_long_enough() {
        let uid = generate_uid();
        assert!(uid.len() >= 16, "uid too short: {}", uid);
        assert!(uid.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn uids_do_not_repeat() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_uid()));
        }
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(36 * 36 + 1), "101");
    }
}
