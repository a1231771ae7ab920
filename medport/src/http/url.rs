//! URL handling helpers.
//!
//! # Example
//!
//! ```
//! use medport::http::urldecode;
//!
//! assert_eq!(urldecode("wholesale%20pricing+request"), "wholesale pricing request");
//! ```

/// Decode a string encoded with percent-encoding, also known as URL encoding.
///
/// `+` is decoded as a space, as sent by HTML forms. Invalid escapes are kept as-is,
/// and invalid UTF-8 is replaced.
pub fn urldecode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let decoded = bytes
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());

                match decoded {
                    Some(byte) => {
                        result.push(byte);
                        i += 3;
                    }
                    None => {
                        result.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                result.push(b' ');
                i += 1;
            }
            byte => {
                result.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&result).to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_urldecode() {
        assert_eq!(urldecode("jane%40pharmacy.eg"), "jane@pharmacy.eg");
        assert_eq!(urldecode("Omega-3%20Premium"), "Omega-3 Premium");
        assert_eq!(urldecode("%D9%85%D8%B1%D8%AD%D8%A8%D8%A7"), "مرحبا");
        assert_eq!(urldecode("100%"), "100%");
        assert_eq!(urldecode("%zz"), "%zz");
    }
}
