//! Secure credential handling using the secrecy crate
//!
//! The PostgreSQL connection string embeds the database password, so it is held
//! in a `Secret` that zeroes its memory on drop and redacts itself in `Debug`
//! output. Use [`redact_connection_string`] whenever the target must be logged.
//!
//! # Example
//!
//! ```rust
//! use vigil::config::{secret_string, redact_connection_string};
//! use secrecy::ExposeSecret;
//!
//! let dsn = secret_string("postgresql://etl:hunter2@db:5432/insurance".to_string());
//! assert_eq!(
//!     redact_connection_string(dsn.expose_secret().as_ref()),
//!     "postgresql://***@db:5432/insurance"
//! );
//! println!("{:?}", dsn); // Prints: Secret([REDACTED ...])
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if the secret value starts with a prefix
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Parse the secret value into another type
    pub fn parse<F: std::str::FromStr>(&self) -> Result<F, F::Err> {
        self.0.parse()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string into a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Strips credentials from a PostgreSQL connection string
///
/// Everything between the scheme and the last `@` is replaced by `***`.
pub fn redact_connection_string(conn: &str) -> String {
    let (scheme, rest) = conn.split_once("://").unwrap_or(("postgresql", conn));
    match rest.rsplit_once('@') {
        Some((_, host)) => format!("{scheme}://***@{host}"),
        None => format!("{scheme}://{rest}"),
    }
}
