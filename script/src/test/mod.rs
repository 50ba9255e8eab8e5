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

//! Scenarios combining script construction, classification and verification.

use crate::address::{decode_destination, encode_destination, ChainType};
use crate::context::testcontext::TestChecker;
use crate::destination::{
    build_script_for_destination, build_stake_delegation_script, build_time_locked_script,
    extract_destination, script_for_multisig, script_for_raw_pubkey, Destination, KeyId,
    ScriptId,
};
use crate::flags::{ScriptFlag, ScriptFlags, STANDARD_SCRIPT_VERIFY_FLAGS};
use crate::opcodes::all as opc;
use crate::sender::extract_sender_data;
use crate::sigencoding::SIGHASH_ALL;
use crate::standard::{solver, Solution, TxOutType};
use crate::{eval_script, verify_script, Builder, Script, ScriptError, Stack};
use crypto::key::{PrivateKey, PublicKey};
use crypto::random::{CryptoRng, Rng};
use rstest::rstest;
use test_utils::random::{make_seedable_rng, Seed};

const TX: &[u8] = b"spending transaction";

fn keys(rng: &mut (impl Rng + CryptoRng), n: usize) -> Vec<(PrivateKey, PublicKey)> {
    (0..n).map(|_| PrivateKey::new_from_rng(rng)).collect()
}

fn p2pkh_spend(checker: &TestChecker, sk: &PrivateKey, script_pubkey: &Script) -> Script {
    let sig = checker.sign(sk, script_pubkey, SIGHASH_ALL);
    Builder::new()
        .push_slice(&sig)
        .push_slice(&sk.public_key().to_bytes())
        .into_script()
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn pay_to_pubkey_hash(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let (sk, pk) = PrivateKey::new_from_rng(&mut rng);
    let script_pubkey = build_script_for_destination(&KeyId::from(&pk).into());
    let checker = TestChecker::new(TX.to_vec());
    let script_sig = p2pkh_spend(&checker, &sk, &script_pubkey);

    assert_eq!(
        verify_script(&script_sig, &script_pubkey, STANDARD_SCRIPT_VERIFY_FLAGS, &checker),
        Ok(())
    );
    let flags = STANDARD_SCRIPT_VERIFY_FLAGS;
    let stack = eval_script(Stack::default(), &script_sig, flags, &checker).unwrap();
    let stack = eval_script(stack, &script_pubkey, flags, &checker).unwrap();
    assert_eq!(stack, Stack::from(vec![vec![1]]));

    // Same signature over a different transaction
    let other = TestChecker::new(b"another transaction".to_vec());
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, STANDARD_SCRIPT_VERIFY_FLAGS, &other),
        Err(ScriptError::SigCheckFailed)
    );

    // Someone else's key
    let (other_sk, _) = PrivateKey::new_from_rng(&mut rng);
    let script_sig = p2pkh_spend(&checker, &other_sk, &script_pubkey);
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, STANDARD_SCRIPT_VERIFY_FLAGS, &checker),
        Err(ScriptError::EqualVerify)
    );
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn pay_to_pubkey_mutated_signature(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let (sk, pk) = PrivateKey::new_from_rng(&mut rng);
    let script_pubkey = script_for_raw_pubkey(&pk);
    let checker = TestChecker::new(TX.to_vec());
    let sig = checker.sign(&sk, &script_pubkey, SIGHASH_ALL);

    let script_sig = Builder::new().push_slice(&sig).into_script();
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, STANDARD_SCRIPT_VERIFY_FLAGS, &checker),
        Ok(())
    );

    for mutated in test_utils::all_single_bit_mutations(&sig) {
        let script_sig = Builder::new().push_slice(&mutated).into_script();
        let result =
            verify_script(&script_sig, &script_pubkey, STANDARD_SCRIPT_VERIFY_FLAGS, &checker);
        assert!(result.is_err(), "mutated signature {mutated:02x?} accepted");
    }
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn pay_to_script_hash_multisig(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let keys = keys(&mut rng, 3);
    let pubkeys: Vec<_> = keys.iter().map(|(_, pk)| *pk).collect();
    let redeem_script = script_for_multisig(2, &pubkeys).unwrap();
    let script_pubkey = build_script_for_destination(&ScriptId::from_script(&redeem_script).into());
    assert_eq!(solver(&script_pubkey).kind(), TxOutType::ScriptHash);
    assert_eq!(solver(&redeem_script).kind(), TxOutType::Multisig);

    let checker = TestChecker::new(TX.to_vec());
    let sig0 = checker.sign(&keys[0].0, &redeem_script, SIGHASH_ALL);
    let sig2 = checker.sign(&keys[2].0, &redeem_script, SIGHASH_ALL);
    let spend = |sigs: &[&[u8]]| {
        sigs.iter()
            .fold(Builder::new().push_int(0), |b, sig| b.push_slice(sig))
            .push_slice(redeem_script.as_bytes())
            .into_script()
    };

    let flags = STANDARD_SCRIPT_VERIFY_FLAGS;
    assert_eq!(
        verify_script(&spend(&[&sig0, &sig2]), &script_pubkey, flags, &checker),
        Ok(())
    );
    // Signatures must follow the key order
    assert_eq!(
        verify_script(&spend(&[&sig2, &sig0]), &script_pubkey, flags, &checker),
        Err(ScriptError::SigCheckFailed)
    );
    // Missing signature leaves too few stack items
    assert_eq!(
        verify_script(&spend(&[&sig0]), &script_pubkey, flags, &checker),
        Err(ScriptError::InvalidStackOperation)
    );
    // Without the flag only the redeem script hash is checked
    assert_eq!(
        verify_script(&spend(&[&sig2, &sig0]), &script_pubkey, ScriptFlags::empty(), &checker),
        Ok(())
    );
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn cold_stake_spending(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let (staker_sk, staker_pk) = PrivateKey::new_from_rng(&mut rng);
    let (owner_sk, owner_pk) = PrivateKey::new_from_rng(&mut rng);
    let script_pubkey =
        build_stake_delegation_script(&KeyId::from(&staker_pk), &KeyId::from(&owner_pk));
    assert_eq!(solver(&script_pubkey).kind(), TxOutType::ColdStake);
    assert_eq!(
        extract_destination(&script_pubkey, true),
        Some(KeyId::from(&owner_pk).into())
    );
    assert_eq!(
        extract_destination(&script_pubkey, false),
        Some(KeyId::from(&staker_pk).into())
    );

    let spend = |checker: &TestChecker, sk: &PrivateKey, as_staker: bool| {
        let sig = checker.sign(sk, &script_pubkey, SIGHASH_ALL);
        Builder::new()
            .push_slice(&sig)
            .push_int(as_staker as i64)
            .push_slice(&sk.public_key().to_bytes())
            .into_script()
    };
    let flags = STANDARD_SCRIPT_VERIFY_FLAGS;

    // Staker only in a coin stake returning the output to the same script
    let coinstake =
        TestChecker::new(TX.to_vec()).with_coinstake_outputs(vec![script_pubkey.clone()]);
    let plain = TestChecker::new(TX.to_vec());
    let staker_sig = spend(&coinstake, &staker_sk, true);
    assert_eq!(verify_script(&staker_sig, &script_pubkey, flags, &coinstake), Ok(()));
    let staker_sig = spend(&plain, &staker_sk, true);
    assert_eq!(
        verify_script(&staker_sig, &script_pubkey, flags, &plain),
        Err(ScriptError::CheckColdStakeVerify)
    );

    // Owner may spend anywhere
    let owner_sig = spend(&plain, &owner_sk, false);
    assert_eq!(verify_script(&owner_sig, &script_pubkey, flags, &plain), Ok(()));

    // Keys cannot swap roles
    let staker_as_owner = spend(&plain, &staker_sk, false);
    assert_eq!(
        verify_script(&staker_as_owner, &script_pubkey, flags, &plain),
        Err(ScriptError::EqualVerify)
    );
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn time_locked_spending(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let (sk, pk) = PrivateKey::new_from_rng(&mut rng);
    let lock_time = rng.gen_range(1..400_000_000i64);
    let script_pubkey = build_time_locked_script(&KeyId::from(&pk).into(), lock_time);

    let spend = |tx_lock_time: i64| {
        let checker = TestChecker::new(TX.to_vec()).with_lock_time(tx_lock_time);
        let script_sig = p2pkh_spend(&checker, &sk, &script_pubkey);
        verify_script(&script_sig, &script_pubkey, STANDARD_SCRIPT_VERIFY_FLAGS, &checker)
    };

    assert_eq!(spend(lock_time), Ok(()));
    assert_eq!(spend(lock_time + 1), Ok(()));
    assert_eq!(spend(lock_time - 1), Err(ScriptError::UnsatisfiedLockTime));
    // A timestamp lock time never satisfies a height
    assert_eq!(spend(600_000_000), Err(ScriptError::UnsatisfiedLockTime));

    // Without the flag the opcode is OP_NOP2
    let checker = TestChecker::new(TX.to_vec());
    let script_sig = p2pkh_spend(&checker, &sk, &script_pubkey);
    let flags = STANDARD_SCRIPT_VERIFY_FLAGS & !ScriptFlags::from(ScriptFlag::CheckLockTimeVerify);
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, flags, &checker),
        Err(ScriptError::DiscourageUpgradableNops)
    );
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, ScriptFlag::P2sh.into(), &checker),
        Ok(())
    );
}

#[rstest]
#[case(201, Ok(()))]
#[case(202, Err(ScriptError::OpCount))]
fn operation_limit(#[case] nops: usize, #[case] expected: crate::Result<()>) {
    let script_pubkey = (0..nops)
        .fold(Builder::new(), |b, _| b.push_opcode(opc::OP_NOP))
        .push_int(1)
        .into_script();
    let script_sig = Builder::new().into_script();
    let flags = STANDARD_SCRIPT_VERIFY_FLAGS & !ScriptFlags::from(ScriptFlag::CleanStack);
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, flags, &TestChecker::default()),
        expected
    );
}

#[rstest]
#[case(&[0x4c, 0x01, 0x07], Err(ScriptError::MinimalData))]
#[case(&[0x01, 0x07], Err(ScriptError::MinimalData))]
#[case(&[0x57], Ok(()))]
fn minimal_pushes(#[case] script_sig: &[u8], #[case] expected: crate::Result<()>) {
    let script_pubkey = Builder::new().push_int(7).push_opcode(opc::OP_EQUAL).into_script();
    let script_sig = Script::from(script_sig);
    let checker = TestChecker::default();
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, STANDARD_SCRIPT_VERIFY_FLAGS, &checker),
        expected
    );
    assert_eq!(
        verify_script(&script_sig, &script_pubkey, ScriptFlags::empty(), &checker),
        Ok(())
    );
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn address_to_script(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let (_, pk) = PrivateKey::new_from_rng(&mut rng);
    let key_id = KeyId::from(&pk);

    for chain in [ChainType::Mainnet, ChainType::Testnet, ChainType::Regtest] {
        let address = encode_destination(&key_id.into(), false, chain).unwrap();
        let decoded = decode_destination(&address, chain).unwrap();
        assert!(!decoded.is_staking);

        let script = build_script_for_destination(&decoded.destination);
        assert_eq!(solver(&script), Solution::PubKeyHash(key_id.to_fixed_bytes()));
        assert_eq!(extract_destination(&script, false), Some(Destination::from(key_id)));
    }

    // Pay to pubkey outputs resolve to the key hash address
    let script = script_for_raw_pubkey(&pk);
    let dest = extract_destination(&script, false).unwrap();
    let address = encode_destination(&dest, false, ChainType::Mainnet).unwrap();
    assert_eq!(
        decode_destination(&address, ChainType::Mainnet).unwrap().destination,
        Destination::KeyHash(key_id)
    );
}

#[rstest]
#[trace]
#[case(Seed::from_entropy())]
fn contract_sender_proof(#[case] seed: Seed) {
    let mut rng = make_seedable_rng(seed);
    let (sk, pk) = PrivateKey::new_from_rng(&mut rng);
    let pubkey_script = build_script_for_destination(&KeyId::from(&pk).into());
    let checker = TestChecker::new(TX.to_vec());
    let signature_script = p2pkh_spend(&checker, &sk, &pubkey_script);

    let output = Builder::new()
        .push_int(4)
        .push_slice(b"contract address")
        .push_opcode(opc::OP_CALL)
        .push_slice(signature_script.as_bytes())
        .push_slice(pubkey_script.as_bytes())
        .push_slice(b"call data")
        .push_opcode(opc::OP_SENDER)
        .into_script();

    let data = extract_sender_data(&output).unwrap();
    assert_eq!(data.program, b"call data".to_vec());
    assert_eq!(
        verify_script(
            &data.signature_script,
            &data.pubkey_script,
            STANDARD_SCRIPT_VERIFY_FLAGS,
            &checker
        ),
        Ok(())
    );
}
