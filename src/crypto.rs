//! Cryptographic primitives for EmberChain

use crate::error::CryptoError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::SECRET_KEY_SIZE,
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
/// This prevents repeated, unnecessary context creation.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Addresses are a fixed-width prefix byte followed by 20 digest bytes of
/// the public key.
pub const ADDRESS_SIZE: usize = 21;

/// Every well-formed address starts with this byte.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Recoverable signatures are 64 compact bytes plus one recovery-id byte.
pub const SIGNATURE_SIZE: usize = 65;

/// Fixed-width account identifier.
pub type Address = [u8; ADDRESS_SIZE];

/// SHA-256 digest.
pub type Sha256Hash = [u8; 32];

/// Hash arbitrary bytes with SHA-256.
pub fn sha256(data: &[u8]) -> Sha256Hash {
    Sha256::digest(data).into()
}

/// Checks the fixed width and the network prefix byte.
pub fn address_valid(address: &[u8]) -> bool {
    address.len() == ADDRESS_SIZE && address[0] == ADDRESS_PREFIX
}

/// Convenience function to create a well-formed address from a string
/// (hashes the string). Useful for testing and debugging.
pub fn address_from_string(s: &str) -> Address {
    let digest = sha256(s.as_bytes());
    let mut address = [0u8; ADDRESS_SIZE];
    address[0] = ADDRESS_PREFIX;
    address[1..].copy_from_slice(&digest[12..]);
    address
}

/// Convert an address to a hex string for display.
pub fn address_to_hex(address: &Address) -> String {
    hex::encode(address)
}

/// Convert a hex string to an address.
pub fn address_from_hex(hex_str: &str) -> Result<Address, CryptoError> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| CryptoError::InvalidAddress(format!("invalid hex address: {}", e)))?;
    if !address_valid(&bytes) {
        return Err(CryptoError::InvalidAddress(format!(
            "address must be {} bytes with prefix {:#04x}",
            ADDRESS_SIZE, ADDRESS_PREFIX
        )));
    }
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidAddress("failed to convert bytes into address".to_string()))
}

/// Derives the address from a public key: the prefix byte followed by the
/// last 20 bytes of SHA-256 over the uncompressed key (without the 0x04 tag).
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let pubkey_bytes = public_key.serialize_uncompressed();
    let digest = sha256(&pubkey_bytes[1..]);
    let mut address = [0u8; ADDRESS_SIZE];
    address[0] = ADDRESS_PREFIX;
    address[1..].copy_from_slice(&digest[12..]);
    address
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from an existing SecretKey.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                CryptoError::InvalidSecretKey(format!(
                    "secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                CryptoError::InvalidSecretKey(format!("invalid secret key bytes: {}", e))
            }
        })?;

        Ok(Self::from_secret_key(secret_key))
    }

    /// The address derived from this keypair's public key.
    pub fn address(&self) -> Address {
        address_from_public_key(&self.public_key)
    }

    /// Signs a precomputed 32-byte digest and returns a recoverable
    /// signature: 64 compact bytes followed by the recovery id.
    pub fn sign_digest(&self, digest: &Sha256Hash) -> Result<[u8; SIGNATURE_SIZE], CryptoError> {
        let message = Message::from_digest_slice(digest)
            .map_err(|e| CryptoError::InvalidSignature(format!("failed to create message: {}", e)))?;

        let signature = SECP256K1_CONTEXT.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut out = [0u8; SIGNATURE_SIZE];
        out[..64].copy_from_slice(&compact);
        out[64] = recovery_id.to_i32() as u8;
        Ok(out)
    }
}

/// Recovers the signer's address from a digest and a recoverable signature.
///
/// Malformed signature bytes are an error, never a panic.
pub fn recover_address(digest: &Sha256Hash, signature: &[u8]) -> Result<Address, CryptoError> {
    if signature.len() != SIGNATURE_SIZE {
        return Err(CryptoError::InvalidSignature(format!(
            "signature must be exactly {} bytes, got {}",
            SIGNATURE_SIZE,
            signature.len()
        )));
    }

    let recovery_id = RecoveryId::from_i32(i32::from(signature[64]))
        .map_err(|e| CryptoError::InvalidSignature(format!("invalid recovery id: {}", e)))?;

    let recoverable = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|e| CryptoError::InvalidSignature(format!("invalid signature: {}", e)))?;

    let message = Message::from_digest_slice(digest)
        .map_err(|e| CryptoError::InvalidSignature(format!("failed to create message: {}", e)))?;

    let public_key = SECP256K1_CONTEXT
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;

    Ok(address_from_public_key(&public_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let keypair = KeyPair::generate();
        assert_eq!(keypair.secret_key.as_ref().len(), SECRET_KEY_SIZE);
        assert!(address_valid(&keypair.address()));
    }

    #[test]
    fn test_address_shape() {
        let keypair = KeyPair::generate();
        let address = keypair.address();
        assert_eq!(address.len(), ADDRESS_SIZE);
        assert_eq!(address[0], ADDRESS_PREFIX);
        // Sanity check: verify hex encoding round-trips
        let hex_str = address_to_hex(&address);
        assert_eq!(hex_str.len(), ADDRESS_SIZE * 2);
        assert_eq!(address_from_hex(&hex_str).unwrap(), address);
    }

    #[test]
    fn test_sign_and_recover() {
        let keypair = KeyPair::generate();
        let digest = sha256(b"Hello, EmberChain!");

        let signature = keypair.sign_digest(&digest).unwrap();
        assert_eq!(signature.len(), SIGNATURE_SIZE);

        let recovered = recover_address(&digest, &signature).unwrap();
        assert_eq!(recovered, keypair.address());
    }

    #[test]
    fn test_recover_with_tampered_digest() {
        let keypair = KeyPair::generate();
        let digest = sha256(b"Original message");
        let tampered = sha256(b"Tampered message");

        let signature = keypair.sign_digest(&digest).unwrap();

        // Recovery still yields some address, just not the signer's.
        let recovered = recover_address(&tampered, &signature).unwrap();
        assert_ne!(recovered, keypair.address());
    }

    #[test]
    fn test_recover_invalid_signature_length() {
        let keypair = KeyPair::generate();
        let digest = sha256(b"Test");
        let signature = keypair.sign_digest(&digest).unwrap();

        let result = recover_address(&digest, &signature[1..]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("signature must be exactly"));
    }

    #[test]
    fn test_recover_invalid_recovery_id() {
        let keypair = KeyPair::generate();
        let digest = sha256(b"Test");
        let mut signature = keypair.sign_digest(&digest).unwrap();
        signature[64] = 17;

        let result = recover_address(&digest, &signature);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid recovery id"));
    }

    #[test]
    fn test_from_secret_bytes_invalid_length() {
        let short_bytes = [0u8; SECRET_KEY_SIZE - 1];
        let result = KeyPair::from_secret_bytes(&short_bytes);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("secret key must be"));
    }

    #[test]
    fn test_address_valid_rejects_bad_prefix() {
        let mut address = address_from_string("account");
        assert!(address_valid(&address));
        address[0] = 0x00;
        assert!(!address_valid(&address));
        assert!(!address_valid(&address[1..]));
    }
}
