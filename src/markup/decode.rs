// src/markup/decode.rs

use encoding_rs::{Encoding, UTF_8};

/// Text produced by [`decode_bytes`], with the encoding that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
    /// True when undecodable sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decodes a raw filing buffer into text. Never fails: bytes that cannot be
/// decoded are replaced, because legacy filings are routinely mislabelled.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    // Valid UTF-8 (or plain ASCII) needs no guessing.
    if let Ok(text) = std::str::from_utf8(strip_utf8_bom(bytes)) {
        return DecodedText {
            text: text.to_string(),
            encoding: UTF_8.name(),
            had_errors: false,
        };
    }

    if let Some(encoding) = detect_encoding(bytes) {
        let (text, used, had_errors) = encoding.decode(bytes);
        if !had_errors {
            tracing::debug!("Decoded {} bytes as {}", bytes.len(), used.name());
            return DecodedText {
                text: text.into_owned(),
                encoding: used.name(),
                had_errors,
            };
        }
        tracing::debug!(
            "Detected encoding {} produced replacement characters, falling back to UTF-8",
            used.name()
        );
    }

    lossy_utf8(bytes)
}

fn lossy_utf8(bytes: &[u8]) -> DecodedText {
    let (text, used, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        tracing::debug!("Lossy UTF-8 decode replaced invalid sequences");
    }
    DecodedText {
        text: text.into_owned(),
        encoding: used.name(),
        had_errors,
    }
}

fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

#[cfg(feature = "charset-detection")]
fn detect_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    Some(detector.guess(None, true))
}

#[cfg(not(feature = "charset-detection"))]
fn detect_encoding(_bytes: &[u8]) -> Option<&'static Encoding> {
    None
}
