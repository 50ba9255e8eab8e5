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

//! Script opcodes.
//!
//! Every byte is an opcode. The [all] module names each of them, [All::classify] sorts them into
//! the groups the interpreter treats uniformly.

#![allow(non_camel_case_types)]

use std::fmt;

/// A script opcode. Any byte value is representable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct All {
    code: u8,
}

impl All {
    pub const fn from_u8(code: u8) -> Self {
        Self { code }
    }

    pub const fn to_u8(self) -> u8 {
        self.code
    }

    /// Opcode name as used in the script assembly representation.
    pub fn name(self) -> &'static str {
        all::name_of(self.code)
    }

    /// Value of a small integer opcode, if this is one (`OP_0` and `OP_1` to `OP_16`).
    pub fn small_int(self) -> Option<u8> {
        match self.code {
            0x00 => Some(0),
            0x51..=0x60 => Some(self.code - 0x50),
            _ => None,
        }
    }

    /// Classify the opcode into the group which determines how it executes.
    pub fn classify(self) -> Class {
        use all::*;

        match self.code {
            0x00..=0x4b => return Class::PushBytes(self.code as u32),
            0x51..=0x60 => return Class::PushNum(self.code as i32 - 0x50),
            0xb0 | 0xb2..=0xb9 => return Class::UpgradableNoOp,
            _ => (),
        }

        match self {
            OP_1NEGATE => Class::PushNum(-1),
            OP_NOP => Class::NoOp,
            // Never valid, even in an unexecuted branch.
            OP_VERIF | OP_VERNOTIF => Class::IllegalOp,
            OP_CAT | OP_SUBSTR | OP_LEFT | OP_RIGHT | OP_INVERT | OP_AND | OP_OR | OP_XOR
            | OP_2MUL | OP_2DIV | OP_MUL | OP_DIV | OP_MOD | OP_LSHIFT | OP_RSHIFT => {
                Class::Disabled
            }
            OP_RETURN => Class::ReturnOp,
            OP_CHECKLOCKTIMEVERIFY => Class::TimeLock,
            OP_CHECKCOLDSTAKEVERIFY => Class::ColdStake,
            OP_ZEROCOINMINT | OP_ZEROCOINSPEND => Class::Zerocoin,
            op => None
                .or_else(|| PushData::try_with(op).map(Class::PushData))
                .or_else(|| AltStack::try_with(op).map(Class::AltStack))
                .or_else(|| Signature::try_with(op).map(Class::Signature))
                .or_else(|| ControlFlow::try_with(op).map(Class::ControlFlow))
                .or_else(|| Contract::try_with(op).map(Class::Contract))
                .or_else(|| Ordinary::try_with(op).map(Class::Ordinary))
                // OP_RESERVED, OP_VER, OP_RESERVED1/2, template placeholders and unassigned
                .unwrap_or(Class::ReservedOp),
        }
    }
}

impl From<u8> for All {
    fn from(code: u8) -> Self {
        Self { code }
    }
}

impl fmt::Debug for All {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, all::name_of(self.code)) {
            (n @ 0x01..=0x4b, _) => write!(f, "OP_PUSHBYTES_{n}"),
            (_, "OP_UNKNOWN") => write!(f, "OP_UNKNOWN_{:#04x}", self.code),
            (_, name) => f.write_str(name),
        }
    }
}

impl fmt::Display for All {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

macro_rules! define_opcodes {
    ($($op:ident = $code:literal),* $(,)?) => {
        /// Named constants for every opcode.
        pub mod all {
            use super::All;

            $(pub const $op: All = All::from_u8($code);)*

            pub(super) fn name_of(code: u8) -> &'static str {
                match code {
                    $($code => stringify!($op),)*
                    _ => "OP_UNKNOWN",
                }
            }
        }
    };
}

define_opcodes! {
    OP_0 = 0x00,
    OP_PUSHBYTES_1 = 0x01,
    OP_PUSHBYTES_20 = 0x14,
    OP_PUSHBYTES_33 = 0x21,
    OP_PUSHBYTES_65 = 0x41,
    OP_PUSHBYTES_75 = 0x4b,
    OP_PUSHDATA1 = 0x4c,
    OP_PUSHDATA2 = 0x4d,
    OP_PUSHDATA4 = 0x4e,
    OP_1NEGATE = 0x4f,
    OP_RESERVED = 0x50,
    OP_1 = 0x51,
    OP_2 = 0x52,
    OP_3 = 0x53,
    OP_4 = 0x54,
    OP_5 = 0x55,
    OP_6 = 0x56,
    OP_7 = 0x57,
    OP_8 = 0x58,
    OP_9 = 0x59,
    OP_10 = 0x5a,
    OP_11 = 0x5b,
    OP_12 = 0x5c,
    OP_13 = 0x5d,
    OP_14 = 0x5e,
    OP_15 = 0x5f,
    OP_16 = 0x60,

    OP_NOP = 0x61,
    OP_VER = 0x62,
    OP_IF = 0x63,
    OP_NOTIF = 0x64,
    OP_VERIF = 0x65,
    OP_VERNOTIF = 0x66,
    OP_ELSE = 0x67,
    OP_ENDIF = 0x68,
    OP_VERIFY = 0x69,
    OP_RETURN = 0x6a,

    OP_TOALTSTACK = 0x6b,
    OP_FROMALTSTACK = 0x6c,
    OP_2DROP = 0x6d,
    OP_2DUP = 0x6e,
    OP_3DUP = 0x6f,
    OP_2OVER = 0x70,
    OP_2ROT = 0x71,
    OP_2SWAP = 0x72,
    OP_IFDUP = 0x73,
    OP_DEPTH = 0x74,
    OP_DROP = 0x75,
    OP_DUP = 0x76,
    OP_NIP = 0x77,
    OP_OVER = 0x78,
    OP_PICK = 0x79,
    OP_ROLL = 0x7a,
    OP_ROT = 0x7b,
    OP_SWAP = 0x7c,
    OP_TUCK = 0x7d,

    OP_CAT = 0x7e,
    OP_SUBSTR = 0x7f,
    OP_LEFT = 0x80,
    OP_RIGHT = 0x81,
    OP_SIZE = 0x82,

    OP_INVERT = 0x83,
    OP_AND = 0x84,
    OP_OR = 0x85,
    OP_XOR = 0x86,
    OP_EQUAL = 0x87,
    OP_EQUALVERIFY = 0x88,
    OP_RESERVED1 = 0x89,
    OP_RESERVED2 = 0x8a,

    OP_1ADD = 0x8b,
    OP_1SUB = 0x8c,
    OP_2MUL = 0x8d,
    OP_2DIV = 0x8e,
    OP_NEGATE = 0x8f,
    OP_ABS = 0x90,
    OP_NOT = 0x91,
    OP_0NOTEQUAL = 0x92,
    OP_ADD = 0x93,
    OP_SUB = 0x94,
    OP_MUL = 0x95,
    OP_DIV = 0x96,
    OP_MOD = 0x97,
    OP_LSHIFT = 0x98,
    OP_RSHIFT = 0x99,
    OP_BOOLAND = 0x9a,
    OP_BOOLOR = 0x9b,
    OP_NUMEQUAL = 0x9c,
    OP_NUMEQUALVERIFY = 0x9d,
    OP_NUMNOTEQUAL = 0x9e,
    OP_LESSTHAN = 0x9f,
    OP_GREATERTHAN = 0xa0,
    OP_LESSTHANOREQUAL = 0xa1,
    OP_GREATERTHANOREQUAL = 0xa2,
    OP_MIN = 0xa3,
    OP_MAX = 0xa4,
    OP_WITHIN = 0xa5,

    OP_RIPEMD160 = 0xa6,
    OP_SHA1 = 0xa7,
    OP_SHA256 = 0xa8,
    OP_HASH160 = 0xa9,
    OP_HASH256 = 0xaa,
    OP_CODESEPARATOR = 0xab,
    OP_CHECKSIG = 0xac,
    OP_CHECKSIGVERIFY = 0xad,
    OP_CHECKMULTISIG = 0xae,
    OP_CHECKMULTISIGVERIFY = 0xaf,

    OP_NOP1 = 0xb0,
    OP_CHECKLOCKTIMEVERIFY = 0xb1,
    OP_NOP3 = 0xb2,
    OP_NOP4 = 0xb3,
    OP_NOP5 = 0xb4,
    OP_NOP6 = 0xb5,
    OP_NOP7 = 0xb6,
    OP_NOP8 = 0xb7,
    OP_NOP9 = 0xb8,
    OP_NOP10 = 0xb9,

    OP_ZEROCOINMINT = 0xc1,
    OP_ZEROCOINSPEND = 0xc2,
    OP_SPEND = 0xc3,
    OP_SENDER = 0xc4,
    OP_CREATE = 0xc5,
    OP_CALL = 0xc6,

    OP_CHECKCOLDSTAKEVERIFY = 0xd1,

    OP_SMALLINTEGER = 0xfa,
    OP_PUBKEYS = 0xfb,
    OP_PUBKEYHASH = 0xfd,
    OP_PUBKEY = 0xfe,
    OP_INVALIDOPCODE = 0xff,
}

/// `OP_NOP2` is the upgradable no-op repurposed for lock time checks.
pub const OP_NOP2: All = all::OP_CHECKLOCKTIMEVERIFY;

/// Broad categories of opcodes with similar behavior.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Class {
    /// Pushes the given number onto the stack.
    PushNum(i32),
    /// Pushes the given number of bytes following the opcode onto the stack.
    PushBytes(u32),
    /// Pushes data with explicit length prefix.
    PushData(PushData),
    /// Does nothing.
    NoOp,
    /// No-op reserved for future soft forks.
    UpgradableNoOp,
    /// Fails the script even when found in an unexecuted branch.
    IllegalOp,
    /// Disabled opcode. Fails the script even when found in an unexecuted branch.
    Disabled,
    /// Fails the script when executed.
    ReservedOp,
    /// Fails the script when executed. Marks outputs as unspendable.
    ReturnOp,
    /// Alt stack manipulation.
    AltStack(AltStack),
    /// Signature checks.
    Signature(Signature),
    /// Conditional execution and code separator.
    ControlFlow(ControlFlow),
    /// Absolute lock time check.
    TimeLock,
    /// Cold staking check delegated to the signature checker.
    ColdStake,
    /// Zerocoin mint and spend markers.
    Zerocoin,
    /// Contract creation, call and sender opcodes.
    Contract(Contract),
    /// All the remaining opcodes.
    Ordinary(Ordinary),
}

macro_rules! opcode_group {
    ($(#[$attr:meta])* $name:ident { $($op:ident),* $(,)? }) => {
        $(#[$attr])*
        #[repr(u8)]
        #[derive(Copy, Clone, PartialEq, Eq, Debug)]
        pub enum $name {
            $($op = all::$op.to_u8()),*
        }

        impl $name {
            /// Try to convert a generic opcode into this group.
            pub fn try_with(op: All) -> Option<Self> {
                match op {
                    $(all::$op => Some($name::$op),)*
                    _ => None,
                }
            }

            pub fn to_all(self) -> All {
                All::from_u8(self as u8)
            }
        }
    };
}

opcode_group!(PushData { OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4 });
opcode_group!(AltStack { OP_TOALTSTACK, OP_FROMALTSTACK });
opcode_group!(Signature {
    OP_CHECKSIG,
    OP_CHECKSIGVERIFY,
    OP_CHECKMULTISIG,
    OP_CHECKMULTISIGVERIFY,
});
opcode_group!(ControlFlow { OP_IF, OP_NOTIF, OP_ELSE, OP_ENDIF, OP_CODESEPARATOR });
opcode_group!(Contract { OP_SPEND, OP_SENDER, OP_CREATE, OP_CALL });
opcode_group!(
    /// Opcodes operating on the main stack only.
    Ordinary {
        OP_VERIFY,
        OP_2DROP, OP_2DUP, OP_3DUP, OP_2OVER, OP_2ROT, OP_2SWAP, OP_IFDUP, OP_DEPTH, OP_DROP,
        OP_DUP, OP_NIP, OP_OVER, OP_PICK, OP_ROLL, OP_ROT, OP_SWAP, OP_TUCK,
        OP_SIZE, OP_EQUAL, OP_EQUALVERIFY,
        OP_1ADD, OP_1SUB, OP_NEGATE, OP_ABS, OP_NOT, OP_0NOTEQUAL, OP_ADD, OP_SUB, OP_BOOLAND,
        OP_BOOLOR, OP_NUMEQUAL, OP_NUMEQUALVERIFY, OP_NUMNOTEQUAL, OP_LESSTHAN, OP_GREATERTHAN,
        OP_LESSTHANOREQUAL, OP_GREATERTHANOREQUAL, OP_MIN, OP_MAX, OP_WITHIN,
        OP_RIPEMD160, OP_SHA1, OP_SHA256, OP_HASH160, OP_HASH256,
    }
);

impl Signature {
    /// Whether the opcode consumes its result, failing the script if false.
    pub fn is_verify(self) -> bool {
        matches!(self, Self::OP_CHECKSIGVERIFY | Self::OP_CHECKMULTISIGVERIFY)
    }
}

impl Ordinary {
    /// Whether the opcode consumes its result, failing the script if false.
    pub fn is_verify(self) -> bool {
        matches!(
            self,
            Self::OP_VERIFY | Self::OP_EQUALVERIFY | Self::OP_NUMEQUALVERIFY
        )
    }
}

/// Encode a small integer 0 to 16 as the corresponding push opcode.
pub fn encode_op_n(n: u8) -> Option<All> {
    match n {
        0 => Some(all::OP_0),
        1..=16 => Some(All::from_u8(0x50 + n)),
        _ => None,
    }
}

/// Decode `OP_0` and `OP_1` to `OP_16` into the number they push.
pub fn decode_op_n(op: All) -> Option<u8> {
    op.small_int()
}
