//! Signing and verification capabilities for the binary artifact.
//!
//! The codec never parses certificates: they travel as opaque DER bytes, and
//! both signature checking and trust decisions are delegated to narrow
//! capabilities so platform certificate stores stay out of the core.

use crate::error::SigningError;
use ahash::AHashMap;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use std::path::PathBuf;

/// A digest signed by some key, together with the signer's certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDigest {
    pub signature: Vec<u8>,
    pub certificate: Vec<u8>,
}

/// The capability to sign an artifact digest.
pub trait ArtifactSigner {
    fn sign(&self, digest: &[u8]) -> Result<SignedDigest, SigningError>;
}

/// The capability to check a signature and judge certificate trust.
///
/// The two judgements are independent: a signature can verify against an
/// untrusted certificate, and a trusted certificate can carry a bad
/// signature.
pub trait SignatureVerifier {
    fn verify_signature(&self, digest: &[u8], signature: &[u8], certificate: &[u8]) -> bool;
    fn is_trusted(&self, certificate: &[u8]) -> bool;
}

/// The two verification outcomes, reported as data and never conflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureOutcome {
    pub signature_valid: bool,
    pub certificate_trusted: bool,
}

/// An in-memory RSA signer (PKCS#1 v1.5 over SHA-1).
#[derive(Debug, Clone)]
pub struct MemorySigner {
    key: RsaPrivateKey,
    certificate: Vec<u8>,
}

impl MemorySigner {
    pub fn new(key: RsaPrivateKey, certificate: Vec<u8>) -> Self {
        Self { key, certificate }
    }

    pub fn from_pkcs8_der(
        thumbprint: &str,
        key_der: &[u8],
        certificate: Vec<u8>,
    ) -> Result<Self, SigningError> {
        let key =
            RsaPrivateKey::from_pkcs8_der(key_der).map_err(|e| SigningError::BadKeyMaterial {
                thumbprint: thumbprint.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(key, certificate))
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }
}

impl ArtifactSigner for MemorySigner {
    fn sign(&self, digest: &[u8]) -> Result<SignedDigest, SigningError> {
        let signature = self
            .key
            .sign(Pkcs1v15Sign::new::<Sha1>(), digest)
            .map_err(|e| SigningError::Signature(e.to_string()))?;
        Ok(SignedDigest {
            signature,
            certificate: self.certificate.clone(),
        })
    }
}

/// An in-memory verifier: checks signatures against one public key and
/// trusts an explicit set of certificates.
#[derive(Debug, Clone)]
pub struct MemoryVerifier {
    public_key: RsaPublicKey,
    trusted: Vec<Vec<u8>>,
}

impl MemoryVerifier {
    pub fn new(public_key: RsaPublicKey) -> Self {
        Self {
            public_key,
            trusted: Vec::new(),
        }
    }

    pub fn trust(mut self, certificate: Vec<u8>) -> Self {
        self.trusted.push(certificate);
        self
    }
}

impl SignatureVerifier for MemoryVerifier {
    fn verify_signature(&self, digest: &[u8], signature: &[u8], _certificate: &[u8]) -> bool {
        self.public_key
            .verify(Pkcs1v15Sign::new::<Sha1>(), digest, signature)
            .is_ok()
    }

    fn is_trusted(&self, certificate: &[u8]) -> bool {
        self.trusted.iter().any(|c| c == certificate)
    }
}

/// Resolves signers by certificate thumbprint. One store lives per
/// compilation environment; the pipeline looks signers up at Emit time.
pub trait KeyStore {
    fn resolve_signer(&self, thumbprint: &str)
    -> Result<Option<Box<dyn ArtifactSigner>>, SigningError>;
}

/// A directory of `<thumbprint>.p8` PKCS#8 keys and `<thumbprint>.cer` DER
/// certificates. Stands in for a platform key store.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    root: PathBuf,
}

impl FileKeyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl KeyStore for FileKeyStore {
    fn resolve_signer(
        &self,
        thumbprint: &str,
    ) -> Result<Option<Box<dyn ArtifactSigner>>, SigningError> {
        let key_path = self.root.join(format!("{thumbprint}.p8"));
        let cert_path = self.root.join(format!("{thumbprint}.cer"));
        if !key_path.exists() || !cert_path.exists() {
            return Ok(None);
        }
        let key_der = std::fs::read(&key_path)?;
        let certificate = std::fs::read(&cert_path)?;
        let signer = MemorySigner::from_pkcs8_der(thumbprint, &key_der, certificate)?;
        Ok(Some(Box::new(signer)))
    }
}

/// An in-memory key store for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    signers: AHashMap<String, MemorySigner>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, thumbprint: &str, signer: MemorySigner) {
        self.signers.insert(thumbprint.to_string(), signer);
    }
}

impl KeyStore for MemoryKeyStore {
    fn resolve_signer(
        &self,
        thumbprint: &str,
    ) -> Result<Option<Box<dyn ArtifactSigner>>, SigningError> {
        Ok(self
            .signers
            .get(thumbprint)
            .cloned()
            .map(|s| Box::new(s) as Box<dyn ArtifactSigner>))
    }
}
