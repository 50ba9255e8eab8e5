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

//! Destinations: the key or script hash an output pays to.

use crypto::hash::hash160;
use crypto::key::{is_valid_public_key, PublicKey};

use crate::error::ScriptError;
use crate::opcodes::{self, all as opc};
use crate::script::{Builder, Script};
use crate::standard::{solver, Solution, TxOutType};
use utils::ensure;

/// Largest key count expressible with a small integer opcode.
const MAX_MULTISIG_SCRIPT_KEYS: usize = 16;

fixed_hash::construct_fixed_hash! {
    /// Hash160 of a public key.
    pub struct KeyId(20);
}

fixed_hash::construct_fixed_hash! {
    /// Hash160 of a redeem script.
    pub struct ScriptId(20);
}

impl KeyId {
    pub fn from_pubkey(pubkey: &[u8]) -> Self {
        Self(hash160(pubkey))
    }
}

impl From<&PublicKey> for KeyId {
    fn from(pubkey: &PublicKey) -> Self {
        Self::from_pubkey(&pubkey.to_bytes())
    }
}

impl ScriptId {
    pub fn from_script(script: &Script) -> Self {
        Self(hash160(script))
    }
}

/// Where an output pays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Destination {
    #[default]
    NoDestination,
    KeyHash(KeyId),
    ScriptHash(ScriptId),
}

impl Destination {
    pub fn is_valid(&self) -> bool {
        !matches!(self, Destination::NoDestination)
    }
}

impl From<KeyId> for Destination {
    fn from(id: KeyId) -> Self {
        Destination::KeyHash(id)
    }
}

impl From<ScriptId> for Destination {
    fn from(id: ScriptId) -> Self {
        Destination::ScriptHash(id)
    }
}

/// All destinations of an output together with the number of them needed to spend it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    pub kind: TxOutType,
    pub destinations: Vec<Destination>,
    pub required: usize,
}

fn key_of_pubkey(pubkey: &[u8]) -> Option<Destination> {
    is_valid_public_key(pubkey).then(|| KeyId::from_pubkey(pubkey).into())
}

/// Extract the single destination of an output.
///
/// Cold stake outputs pay to the owner if `prefer_owner_over_staker` is set, to the staker
/// otherwise. Multisig and other outputs without a single destination yield `None`.
pub fn extract_destination(
    script: &Script,
    prefer_owner_over_staker: bool,
) -> Option<Destination> {
    match solver(script) {
        Solution::PubKey(pubkey) => key_of_pubkey(&pubkey),
        Solution::PubKeyHash(hash) => Some(KeyId(hash).into()),
        Solution::ScriptHash(hash) => Some(ScriptId(hash).into()),
        Solution::ColdStake { staker, owner } => {
            let hash = if prefer_owner_over_staker { owner } else { staker };
            Some(KeyId(hash).into())
        }
        Solution::NonStandard
        | Solution::Multisig { .. }
        | Solution::NullData
        | Solution::ZerocoinMint(_) => None,
    }
}

/// Extract every destination of an output.
///
/// Multisig keys that are not valid public keys are skipped, failing if none is left. Data
/// carrying and non-standard outputs have no destinations.
pub fn extract_all_destinations(script: &Script) -> Option<Destinations> {
    let solution = solver(script);
    let kind = solution.kind();
    let (destinations, required) = match solution {
        Solution::NonStandard | Solution::NullData => return None,
        Solution::Multisig { required, pubkeys } => {
            let keys: Vec<_> =
                pubkeys.iter().map(Vec::as_slice).filter_map(key_of_pubkey).collect();
            if keys.is_empty() {
                return None;
            }
            (keys, required as usize)
        }
        Solution::ColdStake { staker, owner } => {
            (vec![KeyId(staker).into(), KeyId(owner).into()], 2)
        }
        Solution::PubKey(_)
        | Solution::PubKeyHash(_)
        | Solution::ScriptHash(_)
        | Solution::ZerocoinMint(_) => (vec![extract_destination(script, false)?], 1),
    };
    Some(Destinations {
        kind,
        destinations,
        required,
    })
}

fn push_standard_template(builder: Builder, dest: &Destination) -> Option<Builder> {
    match dest {
        Destination::NoDestination => None,
        Destination::KeyHash(id) => Some(
            builder
                .push_opcode(opc::OP_DUP)
                .push_opcode(opc::OP_HASH160)
                .push_slice(id.as_bytes())
                .push_opcode(opc::OP_EQUALVERIFY)
                .push_opcode(opc::OP_CHECKSIG),
        ),
        Destination::ScriptHash(id) => Some(
            builder
                .push_opcode(opc::OP_HASH160)
                .push_slice(id.as_bytes())
                .push_opcode(opc::OP_EQUAL),
        ),
    }
}

/// Pay to public key hash or pay to script hash script. Empty for no destination.
pub fn build_script_for_destination(dest: &Destination) -> Script {
    push_standard_template(Builder::new(), dest).map_or_else(Script::new, Builder::into_script)
}

/// Like [build_script_for_destination] but unspendable before `lock_time`.
pub fn build_time_locked_script(dest: &Destination, lock_time: i64) -> Script {
    let prefix = Builder::new()
        .push_int(lock_time)
        .push_opcode(opc::OP_CHECKLOCKTIMEVERIFY)
        .push_opcode(opc::OP_DROP);
    push_standard_template(prefix, dest).map_or_else(Script::new, Builder::into_script)
}

/// Cold staking script. The staker key may only use the output in a coin stake that pays back
/// to the same script, the owner key may spend it freely.
pub fn build_stake_delegation_script(staker: &KeyId, owner: &KeyId) -> Script {
    Builder::new()
        .push_opcode(opc::OP_DUP)
        .push_opcode(opc::OP_HASH160)
        .push_opcode(opc::OP_ROT)
        .push_opcode(opc::OP_IF)
        .push_opcode(opc::OP_CHECKCOLDSTAKEVERIFY)
        .push_slice(staker.as_bytes())
        .push_opcode(opc::OP_ELSE)
        .push_slice(owner.as_bytes())
        .push_opcode(opc::OP_ENDIF)
        .push_opcode(opc::OP_EQUALVERIFY)
        .push_opcode(opc::OP_CHECKSIG)
        .into_script()
}

pub fn script_for_raw_pubkey(pubkey: &PublicKey) -> Script {
    Builder::new()
        .push_slice(&pubkey.to_bytes())
        .push_opcode(opc::OP_CHECKSIG)
        .into_script()
}

/// Bare `required`-of-`keys.len()` multisig script.
pub fn script_for_multisig(required: usize, keys: &[PublicKey]) -> crate::Result<Script> {
    ensure!(
        (1..=MAX_MULTISIG_SCRIPT_KEYS).contains(&keys.len()),
        ScriptError::PubkeyCount
    );
    ensure!((1..=keys.len()).contains(&required), ScriptError::SigCount);

    let encode = |n: usize| opcodes::encode_op_n(n as u8).ok_or(ScriptError::PubkeyCount);
    let builder = keys
        .iter()
        .fold(Builder::new().push_opcode(encode(required)?), |b, key| {
            b.push_slice(&key.to_bytes())
        });
    Ok(builder
        .push_opcode(encode(keys.len())?)
        .push_opcode(opc::OP_CHECKMULTISIG)
        .into_script())
}

#[cfg(test)]
mod test {
    use super::*;
    use crypto::key::PrivateKey;
    use rstest::rstest;
    use test_utils::random::{make_seedable_rng, Seed};

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn destination_scripts_classify_back(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let (_, pk) = PrivateKey::new_from_rng(&mut rng);
        let key_dest = Destination::from(KeyId::from(&pk));
        let script_dest = Destination::from(ScriptId::from_script(&script_for_raw_pubkey(&pk)));

        let p2pkh = build_script_for_destination(&key_dest);
        assert!(p2pkh.is_pay_to_pubkey_hash());
        assert_eq!(extract_destination(&p2pkh, false), Some(key_dest));

        let p2sh = build_script_for_destination(&script_dest);
        assert!(p2sh.is_pay_to_script_hash());
        assert_eq!(extract_destination(&p2sh, false), Some(script_dest));

        let p2pk = script_for_raw_pubkey(&pk);
        assert!(p2pk.is_pay_to_pubkey());
        assert_eq!(extract_destination(&p2pk, true), Some(key_dest));

        assert!(build_script_for_destination(&Destination::NoDestination).is_empty());
        assert!(!Destination::NoDestination.is_valid());
        assert!(key_dest.is_valid());
    }

    #[test]
    fn invalid_pubkey_has_no_destination() {
        let script = Builder::new()
            .push_slice(&[0x02; 33])
            .push_opcode(opc::OP_CHECKSIG)
            .into_script();
        assert_eq!(solver(&script).kind(), TxOutType::PubKey);
        assert_eq!(extract_destination(&script, false), None);
        assert_eq!(extract_all_destinations(&script), None);
    }

    #[test]
    fn cold_stake_roles() {
        let staker = KeyId::repeat_byte(0x51);
        let owner = KeyId::repeat_byte(0x0e);
        let script = build_stake_delegation_script(&staker, &owner);

        assert!(script.is_pay_to_cold_staking());
        assert_eq!(
            solver(&script).raw_solutions(),
            vec![staker.as_bytes().to_vec(), owner.as_bytes().to_vec()]
        );
        assert_eq!(extract_destination(&script, false), Some(staker.into()));
        assert_eq!(extract_destination(&script, true), Some(owner.into()));

        let all = extract_all_destinations(&script).unwrap();
        assert_eq!(all.kind, TxOutType::ColdStake);
        assert_eq!(all.destinations, vec![staker.into(), owner.into()]);
        assert_eq!(all.required, 2);
    }

    #[test]
    fn time_locked_script() {
        let id = KeyId::repeat_byte(0x33);
        let script = build_time_locked_script(&id.into(), 500_000);
        let expected = Builder::new()
            .push_int(500_000)
            .push_opcode(opc::OP_CHECKLOCKTIMEVERIFY)
            .push_opcode(opc::OP_DROP)
            .push_script(&build_script_for_destination(&id.into()))
            .into_script();
        assert_eq!(script, expected);
        // Not a standard template any more
        assert_eq!(extract_destination(&script, false), None);

        assert!(build_time_locked_script(&Destination::NoDestination, 10).is_empty());
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn multisig_destinations(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let keys: Vec<PublicKey> = (0..3).map(|_| PrivateKey::new_from_rng(&mut rng).1).collect();
        let script = script_for_multisig(2, &keys).unwrap();

        assert_eq!(extract_destination(&script, false), None);
        let all = extract_all_destinations(&script).unwrap();
        assert_eq!(all.kind, TxOutType::Multisig);
        assert_eq!(all.required, 2);
        let expected: Vec<Destination> = keys.iter().map(|k| KeyId::from(k).into()).collect();
        assert_eq!(all.destinations, expected);
    }

    #[test]
    fn multisig_without_valid_keys() {
        let script = Builder::new()
            .push_int(1)
            .push_slice(&[0x02; 33])
            .push_int(1)
            .push_opcode(opc::OP_CHECKMULTISIG)
            .into_script();
        assert_eq!(solver(&script).kind(), TxOutType::Multisig);
        assert_eq!(extract_all_destinations(&script), None);
    }

    #[rstest]
    #[trace]
    #[case(Seed::from_entropy())]
    fn multisig_parameters(#[case] seed: Seed) {
        let mut rng = make_seedable_rng(seed);
        let keys: Vec<PublicKey> =
            (0..17).map(|_| PrivateKey::new_from_rng(&mut rng).1).collect();

        assert_eq!(script_for_multisig(1, &[]), Err(ScriptError::PubkeyCount));
        assert_eq!(script_for_multisig(1, &keys), Err(ScriptError::PubkeyCount));
        assert_eq!(script_for_multisig(0, &keys[..2]), Err(ScriptError::SigCount));
        assert_eq!(script_for_multisig(3, &keys[..2]), Err(ScriptError::SigCount));
        assert!(script_for_multisig(16, &keys[..16]).is_ok());
    }

    #[test]
    fn null_data_has_no_destinations() {
        let script = Builder::new().push_opcode(opc::OP_RETURN).push_slice(b"x").into_script();
        assert_eq!(extract_all_destinations(&script), None);
        assert_eq!(extract_all_destinations(&Script::new()), None);
    }
}
