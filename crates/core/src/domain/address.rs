// Address Domain Model
//
// Wire layout: 20-byte key hash, 1-byte version, 4-byte checksum.
// The version byte follows the key so vanity prefixes stay stable.

use super::error::{DomainError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of the public key hash
pub const KEY_LEN: usize = 20;

/// Length of the address checksum
pub const CHECKSUM_LEN: usize = 4;

/// Total length of the raw address bytes (key + version + checksum)
pub const ADDRESS_LEN: usize = KEY_LEN + 1 + CHECKSUM_LEN;

/// First 4 bytes of sha256(key + version)
pub type Checksum = [u8; CHECKSUM_LEN];

/// Network an address belongs to; selects the version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Main,
    #[default]
    Test,
}

impl Network {
    /// Address version byte for this network
    pub fn version(&self) -> u8 {
        match self {
            Network::Main => 0x0F,
            Network::Test => 0x1F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Test => "test",
        }
    }
}

impl FromStr for Network {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "main" => Ok(Network::Main),
            "test" => Ok(Network::Test),
            other => Err(DomainError::UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chain address (pubkey hash + version + checksum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub key: [u8; KEY_LEN],
    pub version: u8,
    pub checksum: Checksum,
}

impl Address {
    /// Build an address from a pubkey hash, computing its checksum
    pub fn from_key_hash(key: [u8; KEY_LEN], network: Network) -> Self {
        let mut addr = Self {
            key,
            version: network.version(),
            checksum: [0; CHECKSUM_LEN],
        };
        addr.checksum = addr.compute_checksum();
        addr
    }

    /// Decode an address from its base58 encoding, verifying the checksum
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| DomainError::InvalidBase58(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Decode an address from raw `key || version || checksum` bytes
    pub fn from_bytes(b: &[u8]) -> Result<Self> {
        if b.len() != ADDRESS_LEN {
            return Err(DomainError::InvalidAddressLength {
                expected: ADDRESS_LEN,
                actual: b.len(),
            });
        }

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&b[..KEY_LEN]);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&b[KEY_LEN + 1..]);

        let addr = Self {
            key,
            version: b[KEY_LEN],
            checksum,
        };
        if !addr.is_valid_checksum() {
            return Err(DomainError::InvalidChecksum);
        }
        Ok(addr)
    }

    /// Decode and require the address to belong to `network`
    pub fn parse_for_network(s: &str, network: Network) -> Result<Self> {
        let addr = Self::from_base58(s)?;
        addr.verify_version(network)?;
        Ok(addr)
    }

    /// Raw bytes: key, then version, then checksum
    pub fn to_bytes(&self) -> [u8; ADDRESS_LEN] {
        let mut b = [0u8; ADDRESS_LEN];
        b[..KEY_LEN].copy_from_slice(&self.key);
        b[KEY_LEN] = self.version;
        b[KEY_LEN + 1..].copy_from_slice(&self.checksum);
        b
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    pub fn compute_checksum(&self) -> Checksum {
        let mut hasher = Sha256::new();
        hasher.update(self.key);
        hasher.update([self.version]);
        let digest = hasher.finalize();

        let mut c = [0u8; CHECKSUM_LEN];
        c.copy_from_slice(&digest[..CHECKSUM_LEN]);
        c
    }

    pub fn is_valid_checksum(&self) -> bool {
        self.compute_checksum() == self.checksum
    }

    pub fn verify_version(&self, network: Network) -> Result<()> {
        if self.version != network.version() {
            return Err(DomainError::InvalidVersion {
                expected: network.version(),
                actual: self.version,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8 * 7;
        }
        key
    }

    #[test]
    fn test_base58_round_trip_preserves_fields() {
        let addr = Address::from_key_hash(sample_key(), Network::Test);
        let decoded = Address::from_base58(&addr.to_base58()).unwrap();

        assert_eq!(decoded, addr);
        assert_eq!(decoded.version, 0x1F);
        assert!(decoded.is_valid_checksum());
    }

    #[test]
    fn test_checksum_is_sha256_prefix_of_key_and_version() {
        let addr = Address::from_key_hash(sample_key(), Network::Main);

        let mut payload = sample_key().to_vec();
        payload.push(0x0F);
        let digest = Sha256::digest(&payload);

        assert_eq!(&addr.checksum[..], &digest[..4]);
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let addr = Address::from_key_hash(sample_key(), Network::Test);
        let mut bytes = addr.to_bytes();
        bytes[ADDRESS_LEN - 1] ^= 0xFF;

        let encoded = bs58::encode(bytes).into_string();
        assert_eq!(
            Address::from_base58(&encoded),
            Err(DomainError::InvalidChecksum)
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        let encoded = bs58::encode([1u8; 10]).into_string();
        let result = Address::from_base58(&encoded);

        assert_eq!(
            result,
            Err(DomainError::InvalidAddressLength {
                expected: ADDRESS_LEN,
                actual: 10
            })
        );
    }

    #[test]
    fn test_invalid_base58_rejected() {
        // '0', 'O', 'I' and 'l' are not part of the base58 alphabet
        let result = Address::from_base58("0OIl");
        assert!(matches!(result, Err(DomainError::InvalidBase58(_))));
    }

    #[test]
    fn test_version_check_against_network() {
        let addr = Address::from_key_hash(sample_key(), Network::Main);

        assert!(addr.verify_version(Network::Main).is_ok());
        assert_eq!(
            addr.verify_version(Network::Test),
            Err(DomainError::InvalidVersion {
                expected: 0x1F,
                actual: 0x0F
            })
        );
        assert!(Address::parse_for_network(&addr.to_base58(), Network::Test).is_err());
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("main".parse::<Network>().unwrap(), Network::Main);
        assert_eq!("test".parse::<Network>().unwrap(), Network::Test);
        assert!("regtest".parse::<Network>().is_err());
    }

    #[test]
    fn test_serde_uses_base58_string() {
        let addr = Address::from_key_hash(sample_key(), Network::Test);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_base58()));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
