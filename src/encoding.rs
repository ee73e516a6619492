// MyPC Gateway - Fallback Text Decoding
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Ordered-fallback decode for file contents of unknown encoding:
// try each candidate in priority order, return the first clean decode,
// otherwise replace undecodable bytes. Kept as an isolated utility so
// the fallback chain never leaks into tool control flow.

/// Candidate encodings, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Default priority order: strict UTF-8 first, then BOM-backed UTF-16.
pub const DEFAULT_CHAIN: &[Candidate] = &[Candidate::Utf8, Candidate::Utf16Le, Candidate::Utf16Be];

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}

fn try_candidate(bytes: &[u8], candidate: Candidate) -> Option<String> {
    match candidate {
        Candidate::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
        // UTF-16 only accepted with a matching BOM; bare binary data
        // decodes "successfully" as UTF-16 far too often otherwise.
        Candidate::Utf16Le => {
            let rest = bytes.strip_prefix(&[0xFF, 0xFE])?;
            decode_utf16(rest, true)
        }
        Candidate::Utf16Be => {
            let rest = bytes.strip_prefix(&[0xFE, 0xFF])?;
            decode_utf16(rest, false)
        }
    }
}

/// Decode `bytes` with the given candidate chain. First clean decode
/// wins; if every candidate fails, undecodable bytes are replaced with
/// U+FFFD. Never fails.
pub fn decode_with_fallback(bytes: &[u8], chain: &[Candidate]) -> String {
    for candidate in chain {
        if let Some(text) = try_candidate(bytes, *candidate) {
            return text;
        }
    }
    String::from_utf8_lossy(bytes).to_string()
}

/// Decode with the default chain.
pub fn decode(bytes: &[u8]) -> String {
    decode_with_fallback(bytes, DEFAULT_CHAIN)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_utf8_passes_through() {
        assert_eq!(decode("héllo wörld".as_bytes()), "héllo wörld");
    }

    #[test]
    fn utf16_le_with_bom_decodes() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi there".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode(&bytes), "hi there");
    }

    #[test]
    fn utf16_be_with_bom_decodes() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "büro".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode(&bytes), "büro");
    }

    #[test]
    fn invalid_bytes_replaced_not_rejected() {
        let bytes = [b'o', b'k', 0xFF, 0xFE, 0x00, b'x'];
        let text = decode(&bytes[..3]);
        assert!(text.starts_with("ok"));
        assert!(text.contains('\u{FFFD}'));

        // Never panics, always returns something
        let garbage = decode(&bytes);
        assert!(!garbage.is_empty());
    }

    #[test]
    fn chain_order_respected() {
        // ASCII is valid in every candidate; UTF-8 wins because it is first
        let text = decode_with_fallback(b"plain", DEFAULT_CHAIN);
        assert_eq!(text, "plain");
    }
}
