use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};

/// Username and password for HTTP Basic authentication.
///
/// The password is held as a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Base64 of `username:password`, the value after `Basic ` in the
    /// `Authorization` header.
    pub fn basic_token(&self) -> SecretString {
        let raw = format!("{}:{}", self.username, self.password.expose_secret());
        SecretString::from(STANDARD.encode(raw.as_bytes()))
    }
}
