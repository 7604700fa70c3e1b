//! Text decoding for document input files.

use std::borrow::Cow;

/// Decode bytes to a string.
///
/// 1. UTF-8 first (a BOM is stripped)
/// 2. if malformed, the hint encoding, when it names a known label
/// 3. Windows-1252 otherwise (superset of ISO-8859-1, common in old
///    Markdown exports)
///
/// Returns `Cow::Borrowed` when the input is valid UTF-8 without a BOM.
///
/// # Example
///
/// ```
/// use quire::decode_text;
///
/// assert_eq!(decode_text("Zażółć".as_bytes(), None), "Zażółć");
/// assert_eq!(decode_text(b"caf\xe9", None), "café");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_borrowed() {
        let text = decode_text("# Title\n\nbody".as_bytes(), None);
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, "# Title\n\nbody");
    }

    #[test]
    fn test_bom_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBF# Hi", None), "# Hi");
    }

    #[test]
    fn test_hint_encoding() {
        // "Łódź" in ISO-8859-2
        assert_eq!(decode_text(b"\xA3\xF3d\xBC", Some("iso-8859-2")), "Łódź");
    }

    #[test]
    fn test_windows_1252_fallback() {
        assert_eq!(decode_text(b"\x93quoted\x94", None), "\u{201c}quoted\u{201d}");
        assert_eq!(decode_text(b"\x93quoted\x94", Some("bogus")), "\u{201c}quoted\u{201d}");
    }
}
