//! Byte-level text decoding.

/// Bytes inspected when sniffing for binary content.
const SNIFF_LEN: usize = 8192;

/// Decode bytes as UTF-8, dropping invalid sequences.
///
/// Returns `None` when the payload looks binary: a UTF-16 byte-order mark,
/// or NUL bytes making up more than a tenth of the leading sample. Stray
/// NULs in otherwise textual data are kept. A leading UTF-8 byte-order mark
/// is removed.
pub(crate) fn decode_text(bytes: &[u8]) -> Option<String> {
    if looks_binary(bytes) {
        return None;
    }

    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }

    match text.strip_prefix('\u{feff}') {
        Some(rest) => Some(rest.to_string()),
        None => Some(text),
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    if bytes.starts_with(&[0xff, 0xfe]) || bytes.starts_with(&[0xfe, 0xff]) {
        return true;
    }
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    let nuls = sample.iter().filter(|&&b| b == 0).count();
    nuls * 10 > sample.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_passes_through() {
        assert_eq!(decode_text("Sendungsverfolgung über /track".as_bytes()).unwrap(), "Sendungsverfolgung über /track");
    }

    #[test]
    fn truncated_sequence_at_end_is_dropped() {
        // first two bytes of a three-byte sequence
        let bytes = [b'o', b'k', 0xe2, 0x82];
        assert_eq!(decode_text(&bytes).unwrap(), "ok");
    }

    #[test]
    fn bom_is_stripped() {
        let bytes = b"\xef\xbb\xbf{\"a\":1}";
        assert_eq!(decode_text(bytes).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn dense_nul_bytes_mean_binary() {
        assert!(decode_text(b"\x00\x00\x01\x02PK\x00\x00").is_none());
        assert!(decode_text(b"abc\x00def").is_none());
    }

    #[test]
    fn stray_nul_is_kept() {
        let mut bytes = b"trackingNumber 794644790138 ".repeat(4);
        bytes.push(0);
        let text = decode_text(&bytes).unwrap();
        assert!(text.starts_with("trackingNumber 794644790138"));
        assert!(text.ends_with('\0'));
    }

    #[test]
    fn utf16_bom_means_binary() {
        assert!(decode_text(b"\xff\xfeh\x00i\x00").is_none());
        assert!(decode_text(b"\xfe\xff\x00h\x00i").is_none());
    }

    #[test]
    fn empty_input_decodes_to_empty() {
        assert_eq!(decode_text(b"").unwrap(), "");
    }
}
