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

//! Ownership of outputs from the point of view of a key store.

use crate::destination::{build_script_for_destination, Destination, KeyId, ScriptId};
use crate::script::Script;
use crate::standard::{solver, Solution};

/// Keys and scripts known to a wallet.
pub trait KeyStore {
    /// Whether the private key of the given key hash is available.
    fn have_key(&self, key_id: &KeyId) -> bool;

    /// Look up a redeem script by its hash.
    fn get_script(&self, script_id: &ScriptId) -> Option<Script>;

    /// Whether the output script is watched without being spendable.
    fn have_watch_only(&self, script: &Script) -> bool;
}

/// How an output relates to a key store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsMineType {
    No,
    WatchOnly,
    Spendable,
    /// Cold stake output for which only the staker key is held.
    Cold,
    /// Cold stake output for which the owner key is held.
    SpendableDelegated,
}

impl IsMineType {
    pub fn is_mine(self) -> bool {
        self != IsMineType::No
    }
}

/// Classify an output script against the key store.
///
/// Multisig outputs are only considered spendable if all the keys are held. Pay to script hash
/// outputs are classified by their redeem script, if known.
pub fn is_mine<K: KeyStore + ?Sized>(keystore: &K, script: &Script) -> IsMineType {
    let have_key = |hash: &[u8; 20]| keystore.have_key(&KeyId(*hash));

    let result = match solver(script) {
        Solution::NonStandard | Solution::NullData | Solution::ZerocoinMint(_) => None,
        Solution::PubKey(pubkey) => keystore
            .have_key(&KeyId::from_pubkey(&pubkey))
            .then_some(IsMineType::Spendable),
        Solution::PubKeyHash(hash) => have_key(&hash).then_some(IsMineType::Spendable),
        Solution::ScriptHash(hash) => keystore
            .get_script(&ScriptId(hash))
            .map(|redeem_script| is_mine(keystore, &redeem_script))
            .filter(|is_mine| is_mine.is_mine()),
        Solution::ColdStake { staker, owner } => {
            // The owner key takes precedence when both are held
            if have_key(&owner) {
                Some(IsMineType::SpendableDelegated)
            } else if have_key(&staker) {
                Some(IsMineType::Cold)
            } else {
                None
            }
        }
        Solution::Multisig { pubkeys, .. } => pubkeys
            .iter()
            .all(|pubkey| keystore.have_key(&KeyId::from_pubkey(pubkey)))
            .then_some(IsMineType::Spendable),
    };

    result.unwrap_or_else(|| {
        if keystore.have_watch_only(script) {
            IsMineType::WatchOnly
        } else {
            IsMineType::No
        }
    })
}

pub fn is_mine_destination<K: KeyStore + ?Sized>(keystore: &K, dest: &Destination) -> IsMineType {
    is_mine(keystore, &build_script_for_destination(dest))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::destination::{
        build_stake_delegation_script, script_for_multisig, script_for_raw_pubkey,
    };
    use crypto::key::{PrivateKey, PublicKey};
    use rstest::rstest;
    use std::collections::{BTreeMap, BTreeSet};
    use test_utils::random::{make_seedable_rng, Seed};

    #[derive(Default)]
    struct TestKeyStore {
        keys: BTreeSet<KeyId>,
        scripts: BTreeMap<ScriptId, Script>,
        watch_only: Vec<Script>,
    }

    impl KeyStore for TestKeyStore {
        fn have_key(&self, key_id: &KeyId) -> bool {
            self.keys.contains(key_id)
        }

        fn get_script(&self, script_id: &ScriptId) -> Option<Script> {
            self.scripts.get(script_id).cloned()
        }

        fn have_watch_only(&self, script: &Script) -> bool {
            self.watch_only.contains(script)
        }
    }

    fn new_keys(seed: Seed, n: usize) -> Vec<PublicKey> {
        let mut rng = make_seedable_rng(seed);
        (0..n).map(|_| PrivateKey::new_from_rng(&mut rng).1).collect()
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn single_key(#[case] seed: Seed) {
        let keys = new_keys(seed, 1);
        let key_id = KeyId::from(&keys[0]);
        let mut store = TestKeyStore::default();

        let p2pkh = build_script_for_destination(&key_id.into());
        let p2pk = script_for_raw_pubkey(&keys[0]);
        assert_eq!(is_mine(&store, &p2pkh), IsMineType::No);
        assert_eq!(is_mine(&store, &p2pk), IsMineType::No);

        store.watch_only.push(p2pkh.clone());
        assert_eq!(is_mine(&store, &p2pkh), IsMineType::WatchOnly);

        store.keys.insert(key_id);
        assert_eq!(is_mine(&store, &p2pkh), IsMineType::Spendable);
        assert_eq!(is_mine(&store, &p2pk), IsMineType::Spendable);
        assert_eq!(is_mine_destination(&store, &key_id.into()), IsMineType::Spendable);
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn cold_stake(#[case] seed: Seed) {
        let keys = new_keys(seed, 2);
        let staker = KeyId::from(&keys[0]);
        let owner = KeyId::from(&keys[1]);
        let script = build_stake_delegation_script(&staker, &owner);

        let mut store = TestKeyStore::default();
        assert_eq!(is_mine(&store, &script), IsMineType::No);

        store.keys.insert(staker);
        assert_eq!(is_mine(&store, &script), IsMineType::Cold);

        store.keys.insert(owner);
        assert_eq!(is_mine(&store, &script), IsMineType::SpendableDelegated);

        store.keys.remove(&staker);
        assert_eq!(is_mine(&store, &script), IsMineType::SpendableDelegated);
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn multisig_needs_all_keys(#[case] seed: Seed) {
        let keys = new_keys(seed, 3);
        let script = script_for_multisig(1, &keys).unwrap();
        let mut store = TestKeyStore::default();

        for key in &keys[..2] {
            store.keys.insert(KeyId::from(key));
            assert_eq!(is_mine(&store, &script), IsMineType::No);
        }
        store.keys.insert(KeyId::from(&keys[2]));
        assert_eq!(is_mine(&store, &script), IsMineType::Spendable);
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn script_hash_uses_redeem_script(#[case] seed: Seed) {
        let keys = new_keys(seed, 1);
        let redeem_script = script_for_raw_pubkey(&keys[0]);
        let script_id = ScriptId::from_script(&redeem_script);
        let p2sh = build_script_for_destination(&script_id.into());

        let mut store = TestKeyStore::default();
        store.keys.insert(KeyId::from(&keys[0]));
        // Redeem script unknown
        assert_eq!(is_mine(&store, &p2sh), IsMineType::No);

        store.scripts.insert(script_id, redeem_script);
        assert_eq!(is_mine(&store, &p2sh), IsMineType::Spendable);
    }

    #[test]
    fn unspendable_is_never_mine() {
        let script = Script::from(vec![0x6a, 0x01, 0x00]);
        let mut store = TestKeyStore::default();
        assert_eq!(is_mine(&store, &script), IsMineType::No);
        assert!(!is_mine(&store, &script).is_mine());
        store.watch_only.push(script.clone());
        assert_eq!(is_mine(&store, &script), IsMineType::WatchOnly);
    }
}
