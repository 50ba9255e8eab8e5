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

//! Signature checking capability.
//!
//! The interpreter knows nothing about transactions. Whenever a script needs data from the
//! spending transaction it asks a [SignatureChecker] provided by the caller.

use crate::num::ScriptNum;
use crate::script::Script;

/// Transaction dependent checks requested by the interpreter.
///
/// A checker is scoped to the verification of a single input. Every method defaults to a
/// failed check.
pub trait SignatureChecker {
    /// Check `signature` (including its trailing hash type byte) was made by `pubkey` over the
    /// transaction, committing to `script_code`.
    fn check_sig(&self, _signature: &[u8], _pubkey: &[u8], _script_code: &Script) -> bool {
        false
    }

    /// Check the transaction lock time satisfies `lock_time`.
    fn check_locktime(&self, _lock_time: ScriptNum) -> bool {
        false
    }

    /// Check the transaction is a valid cold stake of an output locked by `script`.
    fn check_cold_stake(&self, _script: &Script) -> bool {
        false
    }
}

/// Checker failing every check. Useful for evaluating scripts without a transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseSignatureChecker;

impl SignatureChecker for BaseSignatureChecker {}

impl<T: SignatureChecker + ?Sized> SignatureChecker for &T {
    fn check_sig(&self, signature: &[u8], pubkey: &[u8], script_code: &Script) -> bool {
        (**self).check_sig(signature, pubkey, script_code)
    }

    fn check_locktime(&self, lock_time: ScriptNum) -> bool {
        (**self).check_locktime(lock_time)
    }

    fn check_cold_stake(&self, script: &Script) -> bool {
        (**self).check_cold_stake(script)
    }
}

#[cfg(feature = "testcontext")]
pub mod testcontext {
    //! A self-contained checker for tests.
    //!
    //! The "transaction" is an opaque byte string. Signatures are real secp256k1 ECDSA
    //! signatures over `hash256(transaction || script_code || hash_type)`.

    use super::*;
    use crate::script::LOCKTIME_THRESHOLD;
    use crypto::hash::StreamHasher256;
    use crypto::key::{PrivateKey, PublicKey};

    #[derive(Debug, Clone, Default)]
    pub struct TestChecker {
        pub transaction: Vec<u8>,
        pub lock_time: i64,
        /// Whether the input has a final sequence number, disabling lock time checks.
        pub input_final: bool,
        /// Output scripts when the transaction is a coin stake.
        pub coinstake_outputs: Option<Vec<Script>>,
    }

    impl TestChecker {
        pub fn new(transaction: Vec<u8>) -> Self {
            Self {
                transaction,
                ..Self::default()
            }
        }

        pub fn with_lock_time(mut self, lock_time: i64) -> Self {
            self.lock_time = lock_time;
            self
        }

        pub fn with_coinstake_outputs(mut self, outputs: Vec<Script>) -> Self {
            self.coinstake_outputs = Some(outputs);
            self
        }

        pub fn signature_digest(&self, script_code: &Script, hash_type: u8) -> [u8; 32] {
            StreamHasher256::new()
                .write(&self.transaction)
                .write(script_code)
                .write([hash_type])
                .finalize()
        }

        /// Produce a signature with the hash type appended, as pushed by unlocking scripts.
        pub fn sign(&self, key: &PrivateKey, script_code: &Script, hash_type: u8) -> Vec<u8> {
            let mut sig = key.sign_digest(&self.signature_digest(script_code, hash_type));
            sig.push(hash_type);
            sig
        }
    }

    impl SignatureChecker for TestChecker {
        fn check_sig(&self, signature: &[u8], pubkey: &[u8], script_code: &Script) -> bool {
            let (hash_type, der) = match signature.split_last() {
                Some(split) => split,
                None => return false,
            };
            let pubkey = match PublicKey::from_bytes(pubkey) {
                Ok(pubkey) => pubkey,
                Err(_) => return false,
            };
            pubkey.verify_digest(der, &self.signature_digest(script_code, *hash_type))
        }

        fn check_locktime(&self, lock_time: ScriptNum) -> bool {
            let lock_time = lock_time.value();
            // Heights can only be compared with heights and timestamps with timestamps
            let same_kind = (self.lock_time < LOCKTIME_THRESHOLD)
                == (lock_time < LOCKTIME_THRESHOLD);
            same_kind && lock_time <= self.lock_time && !self.input_final
        }

        fn check_cold_stake(&self, script: &Script) -> bool {
            match &self.coinstake_outputs {
                Some(outputs) => !outputs.is_empty() && outputs.iter().all(|out| out == script),
                None => false,
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::testcontext::TestChecker;
    use super::*;
    use crate::script::Builder;
    use crate::sigencoding::SIGHASH_ALL;
    use crypto::key::PrivateKey;
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Seed};

    #[test]
    fn base_checker_rejects_everything() {
        let checker = BaseSignatureChecker;
        assert!(!checker.check_sig(&[1], &[2], &Script::new()));
        assert!(!checker.check_locktime(ScriptNum::ZERO));
        assert!(!checker.check_cold_stake(&Script::new()));
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn test_checker_signatures(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let (sk, pk) = PrivateKey::new_from_rng(&mut rng);
        let checker = TestChecker::new(b"tx".to_vec());
        let code = Builder::new().push_int(7).into_script();
        let sig = checker.sign(&sk, &code, SIGHASH_ALL);

        assert!(checker.check_sig(&sig, &pk.to_bytes(), &code));
        // Commits to the script code, the transaction and the hash type
        assert!(!checker.check_sig(&sig, &pk.to_bytes(), &Script::new()));
        assert!(!TestChecker::new(b"other".to_vec()).check_sig(&sig, &pk.to_bytes(), &code));
        let mut other_type = sig.clone();
        *other_type.last_mut().unwrap() = 0x02;
        assert!(!checker.check_sig(&other_type, &pk.to_bytes(), &code));
        assert!(!checker.check_sig(&[], &pk.to_bytes(), &code));
    }

    #[rstest]
    #[case(100, 50, true)]
    #[case(100, 100, true)]
    #[case(100, 101, false)]
    #[case(100, 500_000_001, false)]
    #[case(600_000_000, 500_000_001, true)]
    #[case(600_000_000, 100, false)]
    fn test_checker_locktime(#[case] tx_lock: i64, #[case] required: i64, #[case] ok: bool) {
        let checker = TestChecker::new(Vec::new()).with_lock_time(tx_lock);
        assert_eq!(checker.check_locktime(ScriptNum::new(required)), ok);
    }
}
