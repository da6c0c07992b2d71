use crate::error::HashError;

/// Digit-permutation table used to scramble the embedded timestamp before
/// splicing it into the content hash. `new_digit[k] = timestamp_digit[PERM[k]]`.
///
/// These exact values are load-bearing: any already-issued transaction
/// handle was built with this table, so changing it breaks every handle
/// issued before the change.
pub const PERM: [usize; 10] = [5, 0, 1, 8, 4, 6, 2, 3, 9, 7];

/// Positions (into the growing 64→74 character list, applied in order) at
/// which each scrambled timestamp digit is spliced into the sha256 hex
/// digest to produce the 74-character handle.
pub const INSERT_POS: [usize; 10] = [7, 13, 15, 19, 25, 31, 34, 41, 69, 72];

/// Positions (into the 74-character handle, popped in order) at which the
/// scrambled timestamp digits are pulled back out to recover the original
/// 64-character hash and the permuted digit sequence.
pub const EXTRACT_POS: [usize; 10] = [7, 12, 13, 16, 21, 26, 28, 34, 61, 63];

const HASH_LEN: usize = 64;
const HANDLE_LEN: usize = 74;

/// Splice `timestamp` (assumed to render as exactly 10 ASCII digits, true
/// for any Unix second between 2001-09-09 and 2286-11-20) into `content_hash`
/// (a 64-character lowercase hex sha256 digest) to produce the 74-character
/// public handle.
pub fn build_handle(timestamp: i64, content_hash: &str) -> Result<String, HashError> {
    if content_hash.chars().count() != HASH_LEN {
        return Err(HashError::WrongLength(content_hash.chars().count()));
    }

    let ts_digits: Vec<char> = timestamp.to_string().chars().collect();
    if ts_digits.len() != PERM.len() {
        return Err(HashError::Malformed(format!(
            "timestamp {timestamp} does not render as {} digits",
            PERM.len()
        )));
    }

    let scrambled: Vec<char> = PERM.iter().map(|&i| ts_digits[i]).collect();

    let mut chars: Vec<char> = content_hash.chars().collect();
    for (i, &pos) in INSERT_POS.iter().enumerate() {
        chars.insert(pos, scrambled[i]);
    }

    Ok(chars.into_iter().collect())
}

/// Recover the original 64-character content hash and the embedded
/// timestamp from a 74-character handle, without checking anything against
/// a recomputed hash.
pub fn parse_handle(handle: &str) -> Result<(String, i64), HashError> {
    let mut chars: Vec<char> = handle.chars().collect();
    if chars.len() != HANDLE_LEN {
        return Err(HashError::WrongLength(chars.len()));
    }

    let mut extracted = Vec::with_capacity(EXTRACT_POS.len());
    for &pos in EXTRACT_POS.iter() {
        if pos >= chars.len() {
            return Err(HashError::Malformed(handle.to_string()));
        }
        extracted.push(chars.remove(pos));
    }

    let origin_hash: String = chars.into_iter().collect();

    let mut ts_digits = ['0'; 10];
    for (target_pos, slot) in ts_digits.iter_mut().enumerate() {
        let permuted_index = PERM
            .iter()
            .position(|&x| x == target_pos)
            .expect("PERM is a permutation of 0..10");
        *slot = extracted[permuted_index];
    }
    let origin_ts: i64 = ts_digits
        .iter()
        .collect::<String>()
        .parse()
        .map_err(|_| HashError::Malformed(handle.to_string()))?;

    Ok((origin_hash, origin_ts))
}

/// Parse a handle, check it against the independently recomputed content
/// hash, and (if `ttl_seconds` is given) enforce expiry relative to `now`.
pub fn verify_handle(
    handle: &str,
    expected_content_hash: &str,
    now: i64,
    ttl_seconds: Option<i64>,
) -> Result<i64, HashError> {
    let (origin_hash, origin_ts) = parse_handle(handle)?;
    if origin_hash != expected_content_hash {
        return Err(HashError::Mismatch);
    }

    if let Some(ttl) = ttl_seconds
        && now - origin_ts > ttl
    {
        return Err(HashError::Expired {
            submitted_at: origin_ts,
            now,
            ttl_seconds: ttl,
        });
    }

    Ok(origin_ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    fn sha256_hex(data: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    #[test]
    fn round_trips_through_build_and_parse() {
        let content = sha256_hex("txn-raw-payload");
        let ts = 1_753_000_000_i64;

        let handle = build_handle(ts, &content).unwrap();
        assert_eq!(handle.chars().count(), HANDLE_LEN);

        let (origin_hash, origin_ts) = parse_handle(&handle).unwrap();
        assert_eq!(origin_hash, content);
        assert_eq!(origin_ts, ts);
    }

    #[test]
    fn verify_handle_detects_tampering() {
        let content = sha256_hex("a");
        let other = sha256_hex("b");
        let handle = build_handle(1_753_000_000, &content).unwrap();

        assert!(verify_handle(&handle, &other, 1_753_000_000, None).is_err());
        assert!(verify_handle(&handle, &content, 1_753_000_000, None).is_ok());
    }

    #[test]
    fn verify_handle_enforces_expiry() {
        let content = sha256_hex("a");
        let handle = build_handle(1_000_000_000, &content).unwrap();

        let err = verify_handle(&handle, &content, 1_000_000_100, Some(30)).unwrap_err();
        assert!(err.is_expired());

        assert!(verify_handle(&handle, &content, 1_000_000_010, Some(30)).is_ok());
    }

    #[test]
    fn rejects_wrong_length_handle() {
        assert!(parse_handle("too-short").is_err());
    }
}
