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

//! Classification of locking scripts into standard templates.

use std::fmt;

use utils::make_config_setting;

use crate::opcodes::{self, all as opc};
use crate::script::{self, Instruction, Script, MAX_ZEROCOIN_MINT_SCRIPT_SIZE};

/// Maximum number of keys in a multisig output to be relayed.
pub const MAX_STANDARD_MULTISIG_KEYS: u8 = 3;

/// Kind of a locking script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxOutType {
    NonStandard,
    PubKey,
    PubKeyHash,
    ScriptHash,
    Multisig,
    ColdStake,
    NullData,
    ZerocoinMint,
}

impl TxOutType {
    pub fn name(self) -> &'static str {
        match self {
            TxOutType::NonStandard => "nonstandard",
            TxOutType::PubKey => "pubkey",
            TxOutType::PubKeyHash => "pubkeyhash",
            TxOutType::ScriptHash => "scripthash",
            TxOutType::Multisig => "multisig",
            TxOutType::ColdStake => "coldstake",
            TxOutType::NullData => "nulldata",
            TxOutType::ZerocoinMint => "zerocoinmint",
        }
    }
}

impl fmt::Display for TxOutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified locking script together with the data extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    NonStandard,
    PubKey(Vec<u8>),
    PubKeyHash([u8; 20]),
    ScriptHash([u8; 20]),
    /// `required`-of-`pubkeys.len()` multisig.
    Multisig {
        required: u8,
        pubkeys: Vec<Vec<u8>>,
    },
    /// Cold staking delegation. The staker may only stake the output, the owner may spend it.
    ColdStake {
        staker: [u8; 20],
        owner: [u8; 20],
    },
    NullData,
    ZerocoinMint(Vec<u8>),
}

impl Solution {
    pub fn kind(&self) -> TxOutType {
        match self {
            Solution::NonStandard => TxOutType::NonStandard,
            Solution::PubKey(_) => TxOutType::PubKey,
            Solution::PubKeyHash(_) => TxOutType::PubKeyHash,
            Solution::ScriptHash(_) => TxOutType::ScriptHash,
            Solution::Multisig { .. } => TxOutType::Multisig,
            Solution::ColdStake { .. } => TxOutType::ColdStake,
            Solution::NullData => TxOutType::NullData,
            Solution::ZerocoinMint(_) => TxOutType::ZerocoinMint,
        }
    }

    /// The extracted data as a flat list of byte strings.
    ///
    /// Multisig yields `[m], pubkey_1, .., pubkey_n, [n]`, cold stake yields `[staker, owner]`.
    pub fn raw_solutions(&self) -> Vec<Vec<u8>> {
        match self {
            Solution::NonStandard | Solution::NullData => Vec::new(),
            Solution::PubKey(data) | Solution::ZerocoinMint(data) => vec![data.clone()],
            Solution::PubKeyHash(hash) | Solution::ScriptHash(hash) => vec![hash.to_vec()],
            Solution::Multisig { required, pubkeys } => std::iter::once(vec![*required])
                .chain(pubkeys.iter().cloned())
                .chain(std::iter::once(vec![pubkeys.len() as u8]))
                .collect(),
            Solution::ColdStake { staker, owner } => vec![staker.to_vec(), owner.to_vec()],
        }
    }

    pub fn is_standard_kind(&self) -> bool {
        !matches!(self, Solution::NonStandard)
    }
}

/// Template catalogue, tried in order. Placeholder opcodes match data as described in
/// [match_template].
static TEMPLATES: [(TxOutType, &[opcodes::All]); 4] = [
    (TxOutType::PubKey, &[opc::OP_PUBKEY, opc::OP_CHECKSIG]),
    (
        TxOutType::PubKeyHash,
        &[
            opc::OP_DUP,
            opc::OP_HASH160,
            opc::OP_PUBKEYHASH,
            opc::OP_EQUALVERIFY,
            opc::OP_CHECKSIG,
        ],
    ),
    (
        TxOutType::Multisig,
        &[
            opc::OP_SMALLINTEGER,
            opc::OP_PUBKEYS,
            opc::OP_SMALLINTEGER,
            opc::OP_CHECKMULTISIG,
        ],
    ),
    (
        TxOutType::ColdStake,
        &[
            opc::OP_DUP,
            opc::OP_HASH160,
            opc::OP_ROT,
            opc::OP_IF,
            opc::OP_CHECKCOLDSTAKEVERIFY,
            opc::OP_PUBKEYHASH,
            opc::OP_ELSE,
            opc::OP_PUBKEYHASH,
            opc::OP_ENDIF,
            opc::OP_EQUALVERIFY,
            opc::OP_CHECKSIG,
        ],
    ),
];

fn is_pubkey_sized(data: &[u8]) -> bool {
    (33..=65).contains(&data.len())
}

fn to_hash20(data: &[u8]) -> Option<[u8; 20]> {
    data.try_into().ok()
}

/// Match a script against a template, collecting the data matched by placeholders.
///
/// * `OP_PUBKEYS` absorbs a run of pushes of 33 to 65 bytes
/// * `OP_PUBKEY` matches a single push of 33 to 65 bytes
/// * `OP_PUBKEYHASH` matches a push of exactly 20 bytes
/// * `OP_SMALLINTEGER` matches `OP_0` to `OP_16`, yielding the number as a single byte
///
/// Any other template opcode has to match exactly.
fn match_template(script: &Script, template: &[opcodes::All]) -> Option<Vec<Vec<u8>>> {
    let mut instrs = script.instructions().peekable();
    let mut solutions = Vec::new();

    for &expected in template {
        if expected == opc::OP_PUBKEYS {
            while let Some(Ok(Instruction::PushBytes(_, data))) = instrs.peek() {
                if !is_pubkey_sized(data) {
                    break;
                }
                solutions.push(data.to_vec());
                instrs.next();
            }
            continue;
        }

        let instr = instrs.next()?.ok()?;
        match expected {
            opc::OP_PUBKEY => {
                let data = instr.push_data().filter(|d| is_pubkey_sized(d))?;
                solutions.push(data.to_vec());
            }
            opc::OP_PUBKEYHASH => {
                let data = instr.push_data().filter(|d| d.len() == 20)?;
                solutions.push(data.to_vec());
            }
            opc::OP_SMALLINTEGER => {
                let n = instr.opcode().small_int()?;
                solutions.push(vec![n]);
            }
            _ => {
                if instr != Instruction::Op(expected) {
                    return None;
                }
            }
        }
    }

    instrs.next().is_none().then_some(solutions)
}

fn solution_from_template(kind: TxOutType, mut solutions: Vec<Vec<u8>>) -> Option<Solution> {
    let solution = match kind {
        TxOutType::PubKey => Solution::PubKey(solutions.pop()?),
        TxOutType::PubKeyHash => Solution::PubKeyHash(to_hash20(solutions.first()?)?),
        TxOutType::Multisig => {
            let n = *solutions.pop()?.first()?;
            let pubkeys = solutions.split_off(1);
            let required = *solutions.first()?.first()?;
            if required < 1 || required > n || pubkeys.len() != n as usize {
                return None;
            }
            Solution::Multisig { required, pubkeys }
        }
        TxOutType::ColdStake => Solution::ColdStake {
            staker: to_hash20(solutions.first()?)?,
            owner: to_hash20(solutions.get(1)?)?,
        },
        TxOutType::NonStandard
        | TxOutType::ScriptHash
        | TxOutType::NullData
        | TxOutType::ZerocoinMint => return None,
    };
    Some(solution)
}

/// Classify a locking script.
///
/// Pay to script hash takes precedence over everything else, followed by zerocoin mints, data
/// carrying outputs and finally the template catalogue.
pub fn solver(script: &Script) -> Solution {
    let bytes = script.as_bytes();

    if script.is_pay_to_script_hash() {
        return to_hash20(&bytes[2..22]).map_or(Solution::NonStandard, Solution::ScriptHash);
    }

    if script.is_zerocoin_mint() {
        if script.len() > MAX_ZEROCOIN_MINT_SCRIPT_SIZE {
            return Solution::NonStandard;
        }
        return Solution::ZerocoinMint(bytes.get(2..).unwrap_or_default().to_vec());
    }

    if bytes.first() == Some(&opc::OP_RETURN.to_u8()) && script::is_push_only(&bytes[1..]) {
        return Solution::NullData;
    }

    TEMPLATES
        .iter()
        .find_map(|(kind, template)| {
            // A multisig shaped script failing the key count checks is non-standard, it is
            // not matched against the remaining templates.
            let solutions = match_template(script, template)?;
            Some(solution_from_template(*kind, solutions).unwrap_or(Solution::NonStandard))
        })
        .unwrap_or(Solution::NonStandard)
}

/// Number of unlocking script arguments needed to spend an output of given kind, not counting
/// what a redeem script needs.
pub fn script_sig_args_expected(solution: &Solution) -> Option<usize> {
    match solution {
        Solution::NonStandard | Solution::NullData | Solution::ZerocoinMint(_) => None,
        Solution::PubKey(_) => Some(1),
        Solution::PubKeyHash(_) => Some(2),
        Solution::ColdStake { .. } => Some(3),
        Solution::Multisig { required, .. } => Some(*required as usize + 1),
        Solution::ScriptHash(_) => Some(1),
    }
}

make_config_setting!(MaxDatacarrierBytes, usize, 83);
make_config_setting!(AcceptDatacarrier, bool, true);

/// Relay policy for output scripts.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct StandardnessConfig {
    /// Maximum size of a data carrying output script.
    pub max_datacarrier_bytes: MaxDatacarrierBytes,
    /// Whether data carrying outputs are relayed at all.
    pub accept_datacarrier: AcceptDatacarrier,
}

/// Classify the script and check it is acceptable for relay. Returns the kind if it is.
pub fn standard_type(script: &Script, config: &StandardnessConfig) -> Option<TxOutType> {
    match solver(script) {
        Solution::NonStandard => None,
        Solution::Multisig { required, pubkeys } => {
            let n = pubkeys.len();
            let acceptable = (1..=MAX_STANDARD_MULTISIG_KEYS as usize).contains(&n)
                && (1..=n).contains(&(required as usize));
            acceptable.then_some(TxOutType::Multisig)
        }
        Solution::NullData => {
            let acceptable =
                *config.accept_datacarrier && script.len() <= *config.max_datacarrier_bytes;
            acceptable.then_some(TxOutType::NullData)
        }
        solution => Some(solution.kind()),
    }
}

pub fn is_standard(script: &Script, config: &StandardnessConfig) -> bool {
    standard_type(script, config).is_some()
}
