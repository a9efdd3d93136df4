//! Byte-token normalization
//!
//! `fdtget -tbx` prints each byte as unpadded hex (`5` for `0x05`), separated
//! by spaces. Digests are compared as one zero-padded lowercase hex string.

/// Concatenate space-separated byte tokens into a lowercase hex string.
///
/// Each token must be one or two hex digits. Surrounding whitespace and the
/// trailing newline are ignored; an empty input yields an empty string.
pub fn tokens_to_hex(text: &str) -> Result<String, String> {
    let bytes = text
        .split_whitespace()
        .map(parse_token)
        .collect::<Result<Vec<u8>, String>>()?;
    Ok(hex::encode(bytes))
}

fn parse_token(token: &str) -> Result<u8, String> {
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("byte token '{}' is not one or two hex digits", token));
    }
    u8::from_str_radix(token, 16).map_err(|_| format!("byte token '{}' is not hex", token))
}
