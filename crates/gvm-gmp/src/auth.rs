// GMP authentication state.
//
// gvmd has no session id on the Unix socket: every authenticated call
// repeats the `<authenticate>` body in front of the command. The body is
// kept as an `AuthToken` once a login succeeds.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::xml::{Element, params};

/// Username and password used for the GMP login.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Build the `<authenticate>` request body for these credentials.
    pub(crate) fn authenticate_request(&self) -> AuthToken {
        let credentials = Element::with_children(
            "credentials",
            &params([
                ("username", self.username.as_str()),
                ("password", self.password.expose_secret()),
            ]),
        );
        let body = Element::new("authenticate").child(credentials).to_xml();
        AuthToken(SecretString::from(body))
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new("admin", "admin")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The serialized `<authenticate>` body, prepended verbatim to every
/// authenticated request.
///
/// Contains the password in clear text, so it is only exposed when the
/// request is assembled.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn authenticate_request_shape() {
        let token = Credentials::new("admin", "s3cr&t").authenticate_request();
        assert_eq!(
            token.expose(),
            concat!(
                "<authenticate><credentials><username>admin</username>",
                "<password>s3cr&amp;t</password></credentials></authenticate>"
            )
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials::new("admin", "hunter2");
        let token = creds.authenticate_request();
        let rendered = format!("{creds:?} {token:?}");
        assert!(!rendered.contains("hunter2"), "leaked: {rendered}");
        assert!(rendered.contains("admin"));
    }
}
