//! Secure memory handling for the passphrase

use std::fmt;
use std::ops::Deref;

use zeroize::Zeroize;

/// A string that zeros its contents on drop and never prints them
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.inner.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_access() {
        let s: SecureString = "hunter2".into();
        assert_eq!(s.as_str(), "hunter2");
        assert_eq!(s.len(), 7);
    }

    #[test]
    fn test_secure_string_is_redacted() {
        let s = SecureString::new("secret");
        assert!(!format!("{:?}", s).contains("secret"));
        assert!(!format!("{}", s).contains("secret"));
        assert!(format!("{}", s).contains("REDACTED"));
    }
}
