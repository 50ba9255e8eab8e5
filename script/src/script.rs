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

//! Script programs, their builder and the instruction decoder.

use std::fmt;

use crate::error::ScriptError;
use crate::num::{self, ScriptNum};
use crate::opcodes::{self, all as opc};

/// Maximum number of bytes pushable to the stack.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum script length in bytes.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum number of public keys per multisig.
pub const MAX_PUBKEYS_PER_MULTISIG: usize = 20;

/// Maximum number of non-push operations per script.
pub const MAX_OPS_PER_SCRIPT: usize = 201;

/// Maximum number of elements on the main and alt stacks combined.
pub const MAX_STACK_SIZE: usize = 1000;

/// Lock time values below this are block heights, above are UNIX timestamps.
pub const LOCKTIME_THRESHOLD: i64 = 500_000_000;

/// Size of a zerocoin mint output script above which it is rejected by the classifier.
pub const MAX_ZEROCOIN_MINT_SCRIPT_SIZE: usize = 150;

/// A script program. Immutable once built.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Script(Box<[u8]>);

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_vec()
    }

    /// Iterate over the instructions of the script.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.0)
    }

    /// Count the occurrences of given opcode. Decoding stops at the first malformed instruction.
    pub fn find(&self, opcode: opcodes::All) -> usize {
        self.instructions()
            .map_while(Result::ok)
            .filter(|instr| instr.opcode() == opcode)
            .count()
    }

    /// Remove every occurrence of `subscript` that starts on an instruction boundary.
    ///
    /// Returns the resulting script together with the number of occurrences removed. Matches
    /// immediately following a removed match are removed as well.
    pub fn delete_all(&self, subscript: &[u8]) -> (Script, usize) {
        if subscript.is_empty() {
            return (self.clone(), 0);
        }

        let bytes = self.as_bytes();
        let mut result = Vec::with_capacity(bytes.len());
        let mut found = 0usize;
        let mut pos = 0usize;
        let mut copied_up_to = 0usize;

        loop {
            result.extend_from_slice(&bytes[copied_up_to..pos]);
            while bytes[pos..].starts_with(subscript) {
                pos += subscript.len();
                found += 1;
            }
            copied_up_to = pos;
            match decode_instruction(bytes, pos) {
                Some(Ok((_, next))) => pos = next,
                None | Some(Err(_)) => break,
            }
        }

        if found == 0 {
            return (self.clone(), 0);
        }
        result.extend_from_slice(&bytes[copied_up_to..]);
        (result.into(), found)
    }

    /// Check the script consists of data pushes only. Malformed scripts are not push only.
    pub fn is_push_only(&self) -> bool {
        is_push_only(self.as_bytes())
    }

    /// `OP_HASH160 <20 bytes> OP_EQUAL`
    pub fn is_pay_to_script_hash(&self) -> bool {
        matches!(
            &self.0[..],
            [h, 0x14, .., e] if self.len() == 23
                && *h == opc::OP_HASH160.to_u8()
                && *e == opc::OP_EQUAL.to_u8()
        )
    }

    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_pay_to_pubkey_hash(&self) -> bool {
        let b = self.as_bytes();
        b.len() == 25
            && b[0] == opc::OP_DUP.to_u8()
            && b[1] == opc::OP_HASH160.to_u8()
            && b[2] == 0x14
            && b[23] == opc::OP_EQUALVERIFY.to_u8()
            && b[24] == opc::OP_CHECKSIG.to_u8()
    }

    /// `<33 or 65 bytes> OP_CHECKSIG`
    pub fn is_pay_to_pubkey(&self) -> bool {
        match self.as_bytes() {
            [0x21, .., last] if self.len() == 35 => *last == opc::OP_CHECKSIG.to_u8(),
            [0x41, .., last] if self.len() == 67 => *last == opc::OP_CHECKSIG.to_u8(),
            _ => false,
        }
    }

    /// The exact byte layout of a cold staking delegation script.
    pub fn is_pay_to_cold_staking(&self) -> bool {
        let b = self.as_bytes();
        b.len() == 51
            && b[0] == opc::OP_DUP.to_u8()
            && b[1] == opc::OP_HASH160.to_u8()
            && b[2] == opc::OP_ROT.to_u8()
            && b[3] == opc::OP_IF.to_u8()
            && b[4] == opc::OP_CHECKCOLDSTAKEVERIFY.to_u8()
            && b[5] == 0x14
            && b[26] == opc::OP_ELSE.to_u8()
            && b[27] == 0x14
            && b[48] == opc::OP_ENDIF.to_u8()
            && b[49] == opc::OP_EQUALVERIFY.to_u8()
            && b[50] == opc::OP_CHECKSIG.to_u8()
    }

    pub fn is_zerocoin_mint(&self) -> bool {
        self.0.first() == Some(&opc::OP_ZEROCOINMINT.to_u8())
    }

    pub fn is_zerocoin_spend(&self) -> bool {
        self.0.first() == Some(&opc::OP_ZEROCOINSPEND.to_u8())
    }

    /// Whether the output can never be spent: starts with `OP_RETURN` or `OP_INVALIDOPCODE`, or
    /// exceeds the script size limit.
    pub fn is_unspendable(&self) -> bool {
        matches!(
            self.0.first(),
            Some(b) if *b == opc::OP_RETURN.to_u8() || *b == opc::OP_INVALIDOPCODE.to_u8()
        ) || self.len() > MAX_SCRIPT_SIZE
    }

    pub fn has_op_create(&self) -> bool {
        self.find(opc::OP_CREATE) > 0
    }

    pub fn has_op_call(&self) -> bool {
        self.find(opc::OP_CALL) > 0
    }

    pub fn has_op_sender(&self) -> bool {
        self.find(opc::OP_SENDER) > 0
    }

    /// Count signature operations.
    ///
    /// In accurate mode multisig operations preceded by `OP_1` to `OP_16` count as the number of
    /// keys, otherwise they count as the maximum number of keys.
    pub fn sig_op_count(&self, accurate: bool) -> usize {
        let mut count = 0;
        let mut last_opcode = opc::OP_INVALIDOPCODE;
        for instr in self.instructions() {
            let opcode = match instr {
                Ok(instr) => instr.opcode(),
                Err(_) => break,
            };
            match opcode {
                opc::OP_CHECKSIG | opc::OP_CHECKSIGVERIFY => count += 1,
                opc::OP_CHECKMULTISIG | opc::OP_CHECKMULTISIGVERIFY => {
                    count += match last_opcode.small_int() {
                        Some(n) if accurate && n > 0 => n as usize,
                        _ => MAX_PUBKEYS_PER_MULTISIG,
                    }
                }
                _ => (),
            }
            last_opcode = opcode;
        }
        count
    }

    /// Count signature operations of a pay to script hash output, using the redeem script
    /// found as the last push of the given unlocking script.
    pub fn p2sh_sig_op_count(&self, script_sig: &Script) -> usize {
        if !self.is_pay_to_script_hash() {
            return self.sig_op_count(true);
        }

        let mut redeem_script = None;
        for instr in script_sig.instructions() {
            match instr {
                Ok(Instruction::PushBytes(_, data)) => redeem_script = Some(data),
                Ok(Instruction::Op(op)) if op <= opc::OP_16 => redeem_script = None,
                _ => return 0,
            }
        }
        redeem_script.map_or(0, |data| Script::from(data.to_vec()).sig_op_count(true))
    }
}

pub(crate) fn is_push_only(bytes: &[u8]) -> bool {
    Instructions::new(bytes).all(|instr| match instr {
        Ok(Instruction::PushBytes(..)) => true,
        Ok(Instruction::Op(op)) => op <= opc::OP_16,
        Err(_) => false,
    })
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Script {
    fn from(v: Vec<u8>) -> Self {
        Self(v.into_boxed_slice())
    }
}

impl From<&[u8]> for Script {
    fn from(v: &[u8]) -> Self {
        Self(v.into())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self)
    }
}

/// Assembly representation. Pushes of up to 4 bytes are shown as numbers, longer pushes in hex.
impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instructions().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match instr {
                Ok(Instruction::PushBytes(_, data)) if data.len() <= num::DEFAULT_MAX_NUM_SIZE => {
                    let n = ScriptNum::decode(data, false, num::DEFAULT_MAX_NUM_SIZE)
                        .unwrap_or_default();
                    write!(f, "{n}")?
                }
                Ok(Instruction::PushBytes(_, data)) => f.write_str(&hex::encode(data))?,
                Ok(Instruction::Op(op)) => match op.classify() {
                    opcodes::Class::PushNum(n) => write!(f, "{n}")?,
                    _ => write!(f, "{op}")?,
                },
                Err(_) => return f.write_str("[error]"),
            }
        }
        Ok(())
    }
}

impl fmt::LowerHex for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// A decoded instruction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Instruction<'a> {
    /// Data push, together with the opcode used to push it.
    PushBytes(opcodes::All, &'a [u8]),
    /// Any other opcode, including `OP_1NEGATE` and `OP_1` to `OP_16`.
    Op(opcodes::All),
}

impl<'a> Instruction<'a> {
    pub fn opcode(&self) -> opcodes::All {
        match self {
            Instruction::PushBytes(op, _) | Instruction::Op(op) => *op,
        }
    }

    pub fn push_data(&self) -> Option<&'a [u8]> {
        match self {
            Instruction::PushBytes(_, data) => Some(data),
            Instruction::Op(_) => None,
        }
    }

    /// Check a push instruction uses the shortest possible encoding of its data.
    pub fn is_minimal_push(&self) -> bool {
        let (op, data) = match self {
            Instruction::PushBytes(op, data) => (op.to_u8(), *data),
            Instruction::Op(_) => return true,
        };
        match data {
            // Should have used OP_0
            [] => op == opc::OP_0.to_u8(),
            // Should have used OP_1 to OP_16
            [b] if (1..=16).contains(b) => false,
            // Should have used OP_1NEGATE
            [0x81] => false,
            d if d.len() <= 75 => op as usize == d.len(),
            d if d.len() <= 0xff => op == opc::OP_PUSHDATA1.to_u8(),
            d if d.len() <= 0xffff => op == opc::OP_PUSHDATA2.to_u8(),
            _ => true,
        }
    }
}

/// Decode the instruction at `pos`. Returns the instruction and the position following it.
fn decode_instruction(
    bytes: &[u8],
    pos: usize,
) -> Option<Result<(Instruction<'_>, usize), ScriptError>> {
    let op = opcodes::All::from(*bytes.get(pos)?);
    let pos = pos + 1;

    let read_len = |size: usize| -> Result<(usize, usize), ScriptError> {
        let len_bytes = bytes.get(pos..pos + size).ok_or(ScriptError::TruncatedPush)?;
        let len = len_bytes.iter().rev().fold(0usize, |acc, b| (acc << 8) | *b as usize);
        Ok((len, pos + size))
    };

    let (len, start) = match op.classify() {
        opcodes::Class::PushBytes(n) => (n as usize, pos),
        opcodes::Class::PushData(opcodes::PushData::OP_PUSHDATA1) => match read_len(1) {
            Ok(r) => r,
            Err(e) => return Some(Err(e)),
        },
        opcodes::Class::PushData(opcodes::PushData::OP_PUSHDATA2) => match read_len(2) {
            Ok(r) => r,
            Err(e) => return Some(Err(e)),
        },
        opcodes::Class::PushData(opcodes::PushData::OP_PUSHDATA4) => match read_len(4) {
            Ok(r) => r,
            Err(e) => return Some(Err(e)),
        },
        _ => return Some(Ok((Instruction::Op(op), pos))),
    };

    let result = start
        .checked_add(len)
        .and_then(|end| Some((bytes.get(start..end)?, end)))
        .map(|(data, end)| (Instruction::PushBytes(op, data), end))
        .ok_or(ScriptError::TruncatedPush);
    Some(result)
}

/// Iterator over the instructions of a script.
///
/// Yields an error for a push running past the end of the script, nothing is yielded after
/// that.
#[derive(Clone, Debug)]
pub struct Instructions<'a> {
    bytes: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            failed: false,
        }
    }

    /// Byte offset of the next instruction.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The part of the script not yet decoded.
    pub fn subscript(&self) -> &'a [u8] {
        &self.bytes[self.pos.min(self.bytes.len())..]
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match decode_instruction(self.bytes, self.pos)? {
            Ok((instr, next)) => {
                self.pos = next;
                Some(Ok(instr))
            }
            Err(e) => {
                self.failed = true;
                self.pos = self.bytes.len();
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Instructions<'_> {}

/// Script builder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Builder(Vec<u8>);

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Push an integer, using the dedicated opcodes for -1 and 0 to 16.
    pub fn push_int(self, value: i64) -> Self {
        match value {
            -1 => self.push_opcode(opc::OP_1NEGATE),
            0 => self.push_opcode(opc::OP_0),
            1..=16 => self.push_opcode(opcodes::All::from(0x50 + value as u8)),
            _ => self.push_slice(&ScriptNum::new(value).encode()),
        }
    }

    pub fn push_num(self, value: ScriptNum) -> Self {
        self.push_int(value.value())
    }

    /// Push data using the shortest direct push or `OP_PUSHDATA` form for its length.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        let len = data.len();
        match len {
            0..=0x4b => self.0.push(len as u8),
            0x4c..=0xff => {
                self.0.push(opc::OP_PUSHDATA1.to_u8());
                self.0.push(len as u8);
            }
            0x100..=0xffff => {
                self.0.push(opc::OP_PUSHDATA2.to_u8());
                self.0.extend_from_slice(&(len as u16).to_le_bytes());
            }
            _ => {
                self.0.push(opc::OP_PUSHDATA4.to_u8());
                self.0.extend_from_slice(&(len as u32).to_le_bytes());
            }
        }
        self.0.extend_from_slice(data);
        self
    }

    /// Push data, using the small integer opcodes where the data allows it.
    pub fn push_slice_minimal(self, data: &[u8]) -> Self {
        match data {
            [] => self.push_opcode(opc::OP_0),
            [n @ 1..=16] => self.push_opcode(opcodes::All::from(0x50 + n)),
            [0x81] => self.push_opcode(opc::OP_1NEGATE),
            _ => self.push_slice(data),
        }
    }

    pub fn push_opcode(mut self, opcode: opcodes::All) -> Self {
        self.0.push(opcode.to_u8());
        self
    }

    /// Append raw script bytes.
    pub fn push_script(mut self, script: &Script) -> Self {
        self.0.extend_from_slice(script.as_bytes());
        self
    }

    pub fn into_script(self) -> Script {
        self.0.into()
    }
}
