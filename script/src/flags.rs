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

//! Script verification flags.

use enumflags2::{bitflags, make_bitflags, BitFlags};

/// Rule toggles for script verification. Each flag only makes verification stricter.
#[bitflags]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScriptFlag {
    /// Evaluate pay to script hash redeem scripts.
    P2sh = 1 << 0,
    /// Signatures must be strict DER with a defined hash type, public keys must be well formed.
    StrictEnc = 1 << 1,
    /// Signatures must be strict DER.
    DerSig = 1 << 2,
    /// Signatures must be strict DER with S in the lower half of the curve order.
    LowS = 1 << 3,
    /// The dummy element consumed by `OP_CHECKMULTISIG` must be empty.
    NullDummy = 1 << 4,
    /// The unlocking script may only contain pushes.
    SigPushOnly = 1 << 5,
    /// Pushes must use the shortest encoding, numeric operands must be minimally encoded.
    MinimalData = 1 << 6,
    /// Executing `OP_NOP1` and `OP_NOP3` to `OP_NOP10` is an error.
    DiscourageUpgradableNops = 1 << 7,
    /// Exactly one element must remain on the stack after verification.
    CleanStack = 1 << 8,
    /// Execute `OP_CHECKLOCKTIMEVERIFY` instead of treating it as `OP_NOP2`.
    CheckLockTimeVerify = 1 << 9,
    /// Allow `OP_SENDER` in output scripts.
    OutputSender = 1 << 28,
}

pub type ScriptFlags = BitFlags<ScriptFlag>;

/// Flags every block must comply with.
pub const MANDATORY_SCRIPT_VERIFY_FLAGS: ScriptFlags = make_bitflags!(ScriptFlag::{P2sh});

/// Flags standard transactions comply with.
pub const STANDARD_SCRIPT_VERIFY_FLAGS: ScriptFlags = make_bitflags!(ScriptFlag::{
    P2sh
        | DerSig
        | StrictEnc
        | MinimalData
        | NullDummy
        | DiscourageUpgradableNops
        | CleanStack
        | CheckLockTimeVerify
});

/// Standard but not mandatory flags.
pub fn standard_not_mandatory_flags() -> ScriptFlags {
    STANDARD_SCRIPT_VERIFY_FLAGS & !MANDATORY_SCRIPT_VERIFY_FLAGS
}

/// Convert the numeric flag representation, ignoring unknown bits.
pub fn flags_from_bits(bits: u32) -> ScriptFlags {
    ScriptFlags::from_bits_truncate(bits)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flag_bits() {
        assert_eq!(MANDATORY_SCRIPT_VERIFY_FLAGS.bits(), 1);
        assert_eq!(STANDARD_SCRIPT_VERIFY_FLAGS.bits(), 0b11_1101_0111);
        assert!(!STANDARD_SCRIPT_VERIFY_FLAGS.contains(ScriptFlag::OutputSender));
        assert!(!STANDARD_SCRIPT_VERIFY_FLAGS.contains(ScriptFlag::LowS));
        assert!(!standard_not_mandatory_flags().contains(ScriptFlag::P2sh));
        assert_eq!(
            flags_from_bits((1 << 28) | (1 << 20) | 1),
            ScriptFlag::OutputSender | ScriptFlag::P2sh
        );
    }
}
