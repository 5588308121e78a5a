//! `--speed-limit` values: digits with an optional `k` or `m` suffix.

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Parse `10`, `10k`, `10M` into bytes per second. Suffixes are case-insensitive;
/// `0` means unlimited.
pub fn parse_speed_limit(s: &str) -> Result<u64, String> {
    let invalid = || format!("invalid speed limit {:?}: expected digits with an optional k or m suffix", s);

    let (digits, multiplier) = match s.chars().last() {
        Some('k') | Some('K') => (&s[..s.len() - 1], KIB),
        Some('m') | Some('M') => (&s[..s.len() - 1], MIB),
        _ => (s, 1),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value: u64 = digits.parse().map_err(|_| invalid())?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("speed limit {:?} is too large", s))
}
