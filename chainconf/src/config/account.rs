//! Account, address and key material types.
//!
//! These are the validated forms of the account fields found in a source.
//! Parsing is strict: addresses are exactly 16 hex characters and key
//! lengths are fixed by the signature algorithm.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of bytes in an account address.
pub const ADDRESS_LENGTH: usize = 8;

/// Signature algorithm applied when a source omits `sigAlgo`.
pub const DEFAULT_SIGNATURE_ALGORITHM: SignatureAlgorithm = SignatureAlgorithm::EcdsaP256;

/// Hash algorithm applied when a source omits `hashAlgo`.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha3_256;

/// Key index applied when a source omits `keyIndex`.
pub const DEFAULT_KEY_INDEX: u32 = 0;

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// A fixed-width account address.
///
/// Displays as 16 lowercase hex characters without a prefix.
///
/// # Examples
///
/// ```
/// use chainconf::config::Address;
///
/// let address: Address = "0xF8D6E0586B0A20C7".parse().unwrap();
/// assert_eq!(address.to_string(), "f8d6e0586b0a20c7");
/// assert!("f8d6".parse::<Address>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Returns the raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns the address as `0x`-prefixed hex.
    #[must_use]
    pub fn to_hex_with_prefix(&self) -> String {
        format!("0x{self}")
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        if digits.len() != ADDRESS_LENGTH * 2 {
            return Err(format!(
                "address must be {} hex characters, got {}",
                ADDRESS_LENGTH * 2,
                digits.len()
            ));
        }

        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| format!("address is not valid hex: {e}"))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Signature algorithm of an account key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// ECDSA over NIST P-256.
    EcdsaP256,
    /// ECDSA over secp256k1.
    EcdsaSecp256k1,
}

impl SignatureAlgorithm {
    /// Canonical name as written in configuration sources.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EcdsaP256 => "ECDSA_P256",
            Self::EcdsaSecp256k1 => "ECDSA_secp256k1",
        }
    }

    /// Length in bytes of a private key for this algorithm.
    #[must_use]
    pub const fn private_key_len(self) -> usize {
        match self {
            Self::EcdsaP256 | Self::EcdsaSecp256k1 => 32,
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ECDSA_P256" => Ok(Self::EcdsaP256),
            "ECDSA_SECP256K1" => Ok(Self::EcdsaSecp256k1),
            _ => Err(format!(
                "unknown signature algorithm '{s}' (expected ECDSA_P256 or ECDSA_secp256k1)"
            )),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash algorithm used for signing digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA2-256.
    Sha2_256,
    /// SHA3-256.
    Sha3_256,
}

impl HashAlgorithm {
    /// Canonical name as written in configuration sources.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha2_256 => "SHA2_256",
            Self::Sha3_256 => "SHA3_256",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SHA2_256" => Ok(Self::Sha2_256),
            "SHA3_256" => Ok(Self::Sha3_256),
            _ => Err(format!(
                "unknown hash algorithm '{s}' (expected SHA2_256 or SHA3_256)"
            )),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Private key bytes bound to their signature algorithm.
///
/// `Debug` never prints the key bytes; `Display` renders `0x`-prefixed hex
/// and is meant for explicit export only.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    algorithm: SignatureAlgorithm,
    bytes: Vec<u8>,
}

impl PrivateKey {
    /// Decodes a hex private key for the given algorithm.
    ///
    /// # Errors
    ///
    /// Returns a message if the value is not hex or has the wrong length
    /// for `algorithm`.
    pub fn from_hex(value: &str, algorithm: SignatureAlgorithm) -> std::result::Result<Self, String> {
        let digits = strip_hex_prefix(value.trim());
        let bytes = hex::decode(digits).map_err(|e| format!("key is not valid hex: {e}"))?;
        let expected = algorithm.private_key_len();
        if bytes.len() != expected {
            return Err(format!(
                "{algorithm} key must be {} hex characters, got {}",
                expected * 2,
                digits.len()
            ));
        }
        Ok(Self { algorithm, bytes })
    }

    /// Returns the signature algorithm the key belongs to.
    #[must_use]
    pub const fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key as hex without a prefix, as written to sources.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Key material of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountKey {
    /// Index of the key on the account.
    pub index: u32,
    /// Signature algorithm (also carried by `private_key`).
    pub sig_algo: SignatureAlgorithm,
    /// Hash algorithm for signing.
    pub hash_algo: HashAlgorithm,
    /// The private key.
    pub private_key: PrivateKey,
}

/// Where an account's data came from when it was declared indirectly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountReference {
    /// The `fromFile` value as written in the source.
    pub from_file: String,
    /// The `accountName` value, when it differs from the local name.
    pub account_name: Option<String>,
    /// The referenced source, resolved against the referencing source.
    pub source: PathBuf,
}

/// A fully materialized account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account name, unique within a configuration.
    pub name: String,
    /// On-chain address.
    pub address: Address,
    /// Signing key.
    pub key: AccountKey,
    /// Set when the account was loaded through `fromFile`.
    pub reference: Option<AccountReference>,
}

impl Account {
    /// Builds an inline account from raw string inputs.
    ///
    /// Empty `key_index`, `sig_algo` or `hash_algo` select the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] naming the first field that fails
    /// validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainconf::config::{Account, HashAlgorithm};
    ///
    /// let account = Account::from_strings(
    ///     "admin",
    ///     "f8d6e0586b0a20c7",
    ///     "",
    ///     "",
    ///     "SHA2_256",
    ///     "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7",
    /// )
    /// .unwrap();
    /// assert_eq!(account.key.index, 0);
    /// assert_eq!(account.key.hash_algo, HashAlgorithm::Sha2_256);
    /// ```
    pub fn from_strings(
        name: &str,
        address: &str,
        key_index: &str,
        sig_algo: &str,
        hash_algo: &str,
        key: &str,
    ) -> Result<Self> {
        let invalid = |field: &str, message: String| Error::InvalidValue {
            field: field.to_string(),
            message,
        };

        if name.trim().is_empty() {
            return Err(invalid("name", "name must be provided".to_string()));
        }

        let address = address.parse().map_err(|e| invalid("address", e))?;

        let index = if key_index.trim().is_empty() {
            DEFAULT_KEY_INDEX
        } else {
            key_index
                .trim()
                .parse()
                .map_err(|_| invalid("keyIndex", format!("'{key_index}' is not a key index")))?
        };

        let sig_algo = if sig_algo.trim().is_empty() {
            DEFAULT_SIGNATURE_ALGORITHM
        } else {
            sig_algo.parse().map_err(|e| invalid("sigAlgo", e))?
        };

        let hash_algo = if hash_algo.trim().is_empty() {
            DEFAULT_HASH_ALGORITHM
        } else {
            hash_algo.parse().map_err(|e| invalid("hashAlgo", e))?
        };

        let private_key = PrivateKey::from_hex(key, sig_algo).map_err(|e| invalid("key", e))?;

        Ok(Self {
            name: name.trim().to_string(),
            address,
            key: AccountKey {
                index,
                sig_algo,
                hash_algo,
                private_key,
            },
            reference: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "21c5dfdeb0ff03a7a73ef39788563b62c89adea67bbb21ab95e5f710bd1d40b7";

    #[test]
    fn test_address_parse_and_display() {
        let address: Address = "f8d6e0586b0a20c7".parse().unwrap();
        assert_eq!(address.to_string(), "f8d6e0586b0a20c7");
        assert_eq!(address.to_hex_with_prefix(), "0xf8d6e0586b0a20c7");
    }

    #[test]
    fn test_address_rejects_wrong_width() {
        assert!("f8d6e0586b0a20".parse::<Address>().is_err());
        assert!("f8d6e0586b0a20c7ff".parse::<Address>().is_err());
        assert!("".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_rejects_non_hex() {
        let err = "zzd6e0586b0a20c7".parse::<Address>().unwrap_err();
        assert!(err.contains("hex"));
    }

    #[test]
    fn test_algorithm_names_roundtrip() {
        for algo in [SignatureAlgorithm::EcdsaP256, SignatureAlgorithm::EcdsaSecp256k1] {
            assert_eq!(algo.name().parse::<SignatureAlgorithm>().unwrap(), algo);
        }
        for algo in [HashAlgorithm::Sha2_256, HashAlgorithm::Sha3_256] {
            assert_eq!(algo.name().parse::<HashAlgorithm>().unwrap(), algo);
        }
        assert_eq!(
            "ecdsa_p256".parse::<SignatureAlgorithm>().unwrap(),
            SignatureAlgorithm::EcdsaP256
        );
        assert!("RSA".parse::<SignatureAlgorithm>().is_err());
        assert!("MD5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn test_private_key_display_has_prefix() {
        let key = PrivateKey::from_hex(KEY, SignatureAlgorithm::EcdsaP256).unwrap();
        assert_eq!(key.to_string(), format!("0x{KEY}"));
        assert_eq!(key.to_hex(), KEY);
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn test_private_key_accepts_prefix() {
        let key = PrivateKey::from_hex(&format!("0x{KEY}"), SignatureAlgorithm::EcdsaP256).unwrap();
        assert_eq!(key.to_hex(), KEY);
    }

    #[test]
    fn test_private_key_length_checked() {
        let err = PrivateKey::from_hex("21c5dfde", SignatureAlgorithm::EcdsaSecp256k1).unwrap_err();
        assert!(err.contains("ECDSA_secp256k1"));
        assert!(err.contains("64"));
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = PrivateKey::from_hex(KEY, SignatureAlgorithm::EcdsaP256).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains(KEY));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_from_strings_defaults() {
        let account =
            Account::from_strings("emulator-account", "f8d6e0586b0a20c7", "", "", "", KEY).unwrap();
        assert_eq!(account.name, "emulator-account");
        assert_eq!(account.key.index, DEFAULT_KEY_INDEX);
        assert_eq!(account.key.sig_algo, DEFAULT_SIGNATURE_ALGORITHM);
        assert_eq!(account.key.hash_algo, DEFAULT_HASH_ALGORITHM);
        assert!(account.reference.is_none());
    }

    #[test]
    fn test_from_strings_explicit_values() {
        let account = Account::from_strings(
            "admin",
            "0xf1d6e0586b0a20c7",
            "2",
            "ECDSA_secp256k1",
            "SHA2_256",
            KEY,
        )
        .unwrap();
        assert_eq!(account.key.index, 2);
        assert_eq!(account.key.sig_algo, SignatureAlgorithm::EcdsaSecp256k1);
        assert_eq!(account.key.private_key.algorithm(), SignatureAlgorithm::EcdsaSecp256k1);
        assert_eq!(account.key.hash_algo, HashAlgorithm::Sha2_256);
    }

    #[test]
    fn test_from_strings_reports_field() {
        let err = Account::from_strings("admin", "f8d6e0586b0a20c7", "x", "", "", KEY).unwrap_err();
        assert!(format!("{err}").contains("keyIndex"));

        let err = Account::from_strings("", "f8d6e0586b0a20c7", "", "", "", KEY).unwrap_err();
        assert!(format!("{err}").contains("name"));

        let err = Account::from_strings("admin", "f8d6", "", "", "", KEY).unwrap_err();
        assert!(format!("{err}").contains("address"));
    }
}
