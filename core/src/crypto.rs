use p384::ecdsa::signature::hazmat::PrehashSigner;
use p384::ecdsa::{SigningKey as EccSigningKey, VerifyingKey as EccVerifyingKey};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::errors::DeviceError;
use crate::types::Algorithm;

/// Default RSA modulus size in bits. Tests may generate smaller keys through
/// [`generate_rsa_key_pair`].
pub const RSA_KEY_BITS: usize = 2048;

/// Private key material for one of the supported algorithms. Never exported;
/// consumed by [`Signer::signer_for`].
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    Ecc(EccSigningKey),
}

/// Public half of a device key pair, retained for verification by callers.
#[derive(Clone)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Ecc(EccVerifyingKey),
}

/// Freshly generated key pair. Consumed by the device constructor.
pub struct KeyPair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

/// Generate a key pair for `algorithm` with the production parameters.
pub fn generate_key_pair(algorithm: Algorithm) -> Result<KeyPair, DeviceError> {
    match algorithm {
        Algorithm::Rsa => generate_rsa_key_pair(RSA_KEY_BITS),
        Algorithm::Ecc => generate_ecc_key_pair(),
    }
}

/// Generate an RSA key pair with the given modulus size.
pub fn generate_rsa_key_pair(bits: usize) -> Result<KeyPair, DeviceError> {
    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| DeviceError::KeyGenerationFailed(e.to_string()))?;
    let public = RsaPublicKey::from(&private);
    Ok(KeyPair {
        private: PrivateKey::Rsa(private),
        public: PublicKey::Rsa(public),
    })
}

/// Generate an ECDSA key pair on curve P-384.
pub fn generate_ecc_key_pair() -> Result<KeyPair, DeviceError> {
    let private = EccSigningKey::random(&mut OsRng);
    let public = EccVerifyingKey::from(&private);
    Ok(KeyPair {
        private: PrivateKey::Ecc(private),
        public: PublicKey::Ecc(public),
    })
}

/// Algorithm-specific signing capability bound to a private key.
///
/// Both variants hash the input with SHA-256. RSA emits the raw PKCS#1 v1.5
/// octet string; ECC emits the DER-encoded `(r, s)` SEQUENCE.
pub enum Signer {
    Rsa(RsaPrivateKey),
    Ecc(EccSigningKey),
}

impl Signer {
    /// Pair a freshly generated private key with its signer. Fails when the
    /// key variant does not match the algorithm tag.
    pub fn signer_for(algorithm: Algorithm, key: PrivateKey) -> Result<Self, DeviceError> {
        match (algorithm, key) {
            (Algorithm::Rsa, PrivateKey::Rsa(key)) => Ok(Signer::Rsa(key)),
            (Algorithm::Ecc, PrivateKey::Ecc(key)) => Ok(Signer::Ecc(key)),
            _ => Err(DeviceError::UnsupportedKey),
        }
    }

    /// Produce an encoded signature over `data`.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, DeviceError> {
        let digest = Sha256::digest(data);
        match self {
            Signer::Rsa(key) => key
                .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
                .map_err(|e| DeviceError::SigningFailed(e.to_string())),
            Signer::Ecc(key) => {
                let signature: p384::ecdsa::Signature = key
                    .sign_prehash(&digest)
                    .map_err(|e| DeviceError::SigningFailed(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    }
}
