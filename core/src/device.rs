use std::fmt;
use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use uuid::Uuid;

use crate::crypto::{KeyPair, PublicKey, Signer};
use crate::errors::DeviceError;
use crate::types::Algorithm;

/// Chain state a device mutates per committed signature. Only ever touched
/// behind the device mutex.
struct ChainState {
    signature_counter: u64,
    last_signature: Option<Vec<u8>>,
}

impl ChainState {
    /// Promote a produced signature into the chain.
    fn commit_signature(&mut self, signature: Vec<u8>) {
        self.signature_counter += 1;
        self.last_signature = Some(signature);
    }
}

/// A signature device: one key pair, one signer, and a monotonic chain of
/// signatures. Identity, key material, and algorithm are immutable; the chain
/// state advances only through [`SignatureDevice::sign`].
pub struct SignatureDevice {
    id: Uuid,
    label: Option<String>,
    algorithm: Algorithm,
    public_key: PublicKey,
    signer: Signer,
    chain: Mutex<ChainState>,
}

// Key material stays out of debug output.
impl fmt::Debug for SignatureDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureDevice")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SignatureDevice {
    /// Assemble a device from a freshly generated key pair. The signer takes
    /// ownership of the private key; it is not retrievable afterwards.
    pub fn new(
        id: Uuid,
        label: Option<String>,
        algorithm: Algorithm,
        key_pair: KeyPair,
    ) -> Result<Self, DeviceError> {
        let signer = Signer::signer_for(algorithm, key_pair.private)?;
        Ok(Self {
            id,
            label,
            algorithm,
            public_key: key_pair.public,
            signer,
            chain: Mutex::new(ChainState {
                signature_counter: 0,
                last_signature: None,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Number of signatures committed so far.
    pub fn signature_counter(&self) -> u64 {
        self.chain.lock().unwrap().signature_counter
    }

    /// Raw bytes of the most recently committed signature, if any.
    pub fn last_signature(&self) -> Option<Vec<u8>> {
        self.chain.lock().unwrap().last_signature.clone()
    }

    /// Build the secured data envelope for the chain state `chain`:
    /// `<counter>_<data>_<base64 prev>`. The first link chains back to the
    /// device id; every later link to the previous signature.
    fn build_sign_data(&self, chain: &ChainState, data: &str) -> String {
        let encoded_prev = match &chain.last_signature {
            Some(signature) => B64.encode(signature),
            None => B64.encode(self.id.to_string().as_bytes()),
        };
        format!("{}_{}_{}", chain.signature_counter, data, encoded_prev)
    }

    /// Run the build → sign → commit protocol for `data` and return the
    /// envelope that was signed together with the raw signature bytes.
    ///
    /// The whole sequence is one critical section: the counter read while
    /// building the envelope is exactly the one the commit promotes, so two
    /// concurrent calls can never emit identically numbered signatures. If
    /// the signer fails, the chain state is left untouched and a retry is
    /// safe.
    pub fn sign(&self, data: &str) -> Result<(String, Vec<u8>), DeviceError> {
        let mut chain = self.chain.lock().unwrap();

        // 1) Build the envelope from the current chain state
        let secured_data = self.build_sign_data(&chain, data);

        // 2) Sign inside the lock
        let signature = self.signer.sign(secured_data.as_bytes())?;

        // 3) Commit: advance the counter and replace the last signature
        chain.commit_signature(signature.clone());

        Ok((secured_data, signature))
    }
}
