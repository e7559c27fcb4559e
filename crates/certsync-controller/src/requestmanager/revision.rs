//! Revision arithmetic and the `revision` annotation encoding.

/// The revision the next issuance should carry.
///
/// `None` and `Some(0)` both mean nothing has been issued yet, so the
/// first target is 1.
pub fn target_revision(current: Option<u64>) -> u64 {
    current.unwrap_or(0).saturating_add(1)
}

/// Parse a `revision` annotation value.
///
/// Only canonical non-negative decimals are accepted: no sign, no
/// whitespace, no leading zeros.
pub fn parse_revision(value: &str) -> Option<u64> {
    let bytes = value.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    value.parse().ok()
}

pub fn format_revision(revision: u64) -> String {
    revision.to_string()
}
