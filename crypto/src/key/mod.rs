// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! secp256k1 keys and the ECDSA signature encoding rules enforced by script verification.

use secp256k1::{ecdsa, Message, SECP256K1};

use crate::random::{CryptoRng, Rng};

pub const COMPRESSED_PUBKEY_SIZE: usize = 33;
pub const UNCOMPRESSED_PUBKEY_SIZE: usize = 65;
pub const SECRET_KEY_SIZE: usize = 32;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum KeyError {
    #[error("Invalid secret key data")]
    InvalidSecretKey,
    #[error("Invalid public key data")]
    InvalidPublicKey,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PrivateKey {
    key: secp256k1::SecretKey,
    compressed: bool,
}

impl PrivateKey {
    pub fn new_from_rng(rng: &mut (impl Rng + CryptoRng)) -> (PrivateKey, PublicKey) {
        let key = secp256k1::SecretKey::new(rng);
        let private_key = PrivateKey {
            key,
            compressed: true,
        };
        let public_key = private_key.public_key();
        (private_key, public_key)
    }

    pub fn from_bytes(bytes: &[u8], compressed: bool) -> Result<Self, KeyError> {
        let key =
            secp256k1::SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { key, compressed })
    }

    pub fn secret_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.key.secret_bytes()
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            key: self.key.public_key(SECP256K1),
            compressed: self.compressed,
        }
    }

    /// Produce a low-S DER encoded ECDSA signature over a 32-byte digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Vec<u8> {
        let msg = Message::from_digest(*digest);
        SECP256K1.sign_ecdsa(&msg, &self.key).serialize_der().to_vec()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PublicKey {
    key: secp256k1::PublicKey,
    compressed: bool,
}

impl PublicKey {
    /// Parse a serialized public key. The serialization form is remembered.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let key = secp256k1::PublicKey::from_slice(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self {
            key,
            compressed: bytes.len() == COMPRESSED_PUBKEY_SIZE,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.key.serialize().to_vec()
        } else {
            self.key.serialize_uncompressed().to_vec()
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Verify a DER signature over a 32-byte digest.
    ///
    /// Signatures are parsed leniently and normalized to low S before verification, strictness
    /// is enforced separately by the script flags.
    pub fn verify_digest(&self, signature: &[u8], digest: &[u8; 32]) -> bool {
        let mut sig = match ecdsa::Signature::from_der_lax(signature) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        sig.normalize_s();
        let msg = Message::from_digest(*digest);
        SECP256K1.verify_ecdsa(&msg, &sig, &self.key).is_ok()
    }
}

/// Check the bytes form a valid point on the curve in either serialization.
pub fn is_valid_public_key(bytes: &[u8]) -> bool {
    PublicKey::from_bytes(bytes).is_ok()
}

/// Check the DER signature (without the trailing hash type byte) has an S value in the lower
/// half of the curve order.
pub fn is_low_s_signature(signature: &[u8]) -> bool {
    match ecdsa::Signature::from_der_lax(signature) {
        Ok(orig) => {
            let mut normalized = orig;
            normalized.normalize_s();
            normalized == orig
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hash::sha256;
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Seed};

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn sign_and_verify(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let (sk, pk) = PrivateKey::new_from_rng(&mut rng);
        let digest = sha256(b"message");
        let sig = sk.sign_digest(&digest);

        assert!(pk.verify_digest(&sig, &digest));
        assert!(is_low_s_signature(&sig));
        assert!(!pk.verify_digest(&sig, &sha256(b"other message")));

        let mut corrupted = sig.clone();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0x01;
        assert!(!pk.verify_digest(&corrupted, &digest));
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn public_key_serialization(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let (sk, pk) = PrivateKey::new_from_rng(&mut rng);
        assert!(pk.is_compressed());
        assert_eq!(pk.to_bytes().len(), COMPRESSED_PUBKEY_SIZE);
        assert_eq!(PublicKey::from_bytes(&pk.to_bytes()), Ok(pk));

        let uncompressed = PrivateKey::from_bytes(&sk.secret_bytes(), false).unwrap();
        let upk = uncompressed.public_key();
        assert_eq!(upk.to_bytes().len(), UNCOMPRESSED_PUBKEY_SIZE);
        assert!(is_valid_public_key(&upk.to_bytes()));
    }

    #[test]
    fn invalid_public_keys() {
        assert!(!is_valid_public_key(&[]));
        assert!(!is_valid_public_key(&[0x02; 32]));
        assert!(!is_valid_public_key(&[0x05; 33]));
        assert_eq!(
            PrivateKey::from_bytes(&[0u8; 32], true),
            Err(KeyError::InvalidSecretKey)
        );
    }
}
