//! Handle parsing the `Authorization` header.
use base64::prelude::*;

#[derive(Debug, PartialEq)]
pub enum Authorization {
    /// HTTP Basic authentication.
    Basic { user: String, password: String },

    /// Bearer authentication. Token validation is up to the caller.
    Bearer { token: String },
}

impl Authorization {
    pub fn parse(header: &str) -> Option<Authorization> {
        let (scheme, value) = header.trim().split_once(' ')?;
        let value = value.trim();

        if value.is_empty() {
            return None;
        }

        if scheme.eq_ignore_ascii_case("basic") {
            Self::basic(value)
        } else if scheme.eq_ignore_ascii_case("bearer") {
            Some(Authorization::Bearer {
                token: value.to_owned(),
            })
        } else {
            None
        }
    }

    fn basic(value: &str) -> Option<Authorization> {
        let decoded = BASE64_STANDARD.decode(value.as_bytes()).ok()?;
        let decoded = String::from_utf8_lossy(&decoded);

        // Passwords may contain colons, user names can't.
        let (user, password) = decoded.split_once(':')?;

        Some(Authorization::Basic {
            user: user.to_owned(),
            password: password.to_owned(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            Authorization::parse("Bearer abc"),
            Some(Authorization::Bearer {
                token: "abc".into()
            })
        );
        assert_eq!(
            Authorization::parse("Basic YWRtaW46b3BlbjpzZXNhbWU="),
            Some(Authorization::Basic {
                user: "admin".into(),
                password: "open:sesame".into(),
            })
        );
        assert_eq!(Authorization::parse("Bearer "), None);
        assert_eq!(Authorization::parse("Digest abc"), None);
        assert_eq!(Authorization::parse("Basic !!!"), None);
    }
}
