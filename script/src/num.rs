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

//! Script integers.
//!
//! Numbers on the stack are little endian magnitudes with the sign carried in the most
//! significant bit of the last byte. Zero is the empty byte string. Operands are limited to
//! 4 bytes, results of arithmetic may overflow that range and are only checked when they are
//! read back as operands.

use std::fmt;

use utils::ensure;

/// Default maximum size of an integer operand.
pub const DEFAULT_MAX_NUM_SIZE: usize = 4;

/// Maximum size of a lock time operand, needed to go past 2038.
pub const LOCKTIME_MAX_NUM_SIZE: usize = 5;

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ScriptNumError {
    #[error("Numeric operand of {0} bytes exceeds the maximum of {1}")]
    Overflow(usize, usize),
    #[error("Numeric operand is not minimally encoded")]
    NonMinimalEncoding,
    #[error("Arithmetic result overflows")]
    ArithmeticOverflow,
    #[error("Arithmetic result underflows")]
    ArithmeticUnderflow,
}

/// A script integer.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ScriptNum(i64);

impl ScriptNum {
    pub const ZERO: ScriptNum = ScriptNum(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Decode a number from its stack representation.
    pub fn decode(
        bytes: &[u8],
        require_minimal: bool,
        max_size: usize,
    ) -> Result<Self, ScriptNumError> {
        if bytes.len() > max_size {
            return Err(ScriptNumError::Overflow(bytes.len(), max_size));
        }
        if require_minimal && !is_minimally_encoded(bytes) {
            return Err(ScriptNumError::NonMinimalEncoding);
        }

        let (last, rest) = match bytes.split_last() {
            Some(split) => split,
            None => return Ok(Self::ZERO),
        };

        let overflow = ScriptNumError::Overflow(bytes.len(), max_size);
        let mut magnitude = 0i128;
        for (i, b) in rest.iter().chain(std::iter::once(&(last & 0x7f))).enumerate() {
            if *b == 0 {
                continue;
            }
            ensure!(i < 9, overflow);
            magnitude |= (*b as i128) << (8 * i);
        }
        let value = if last & 0x80 != 0 { -magnitude } else { magnitude };
        i64::try_from(value)
            .map(Self)
            .map_err(|_| overflow)
    }

    /// Encode the number in its canonical minimal form.
    pub fn encode(self) -> Vec<u8> {
        encode_i64(self.0)
    }

    pub fn checked_add(self, other: Self) -> Result<Self, ScriptNumError> {
        self.0.checked_add(other.0).map(Self).ok_or(if other.0 > 0 {
            ScriptNumError::ArithmeticOverflow
        } else {
            ScriptNumError::ArithmeticUnderflow
        })
    }

    pub fn checked_sub(self, other: Self) -> Result<Self, ScriptNumError> {
        self.0.checked_sub(other.0).map(Self).ok_or(if other.0 < 0 {
            ScriptNumError::ArithmeticOverflow
        } else {
            ScriptNumError::ArithmeticUnderflow
        })
    }

    pub fn checked_neg(self) -> Result<Self, ScriptNumError> {
        self.0.checked_neg().map(Self).ok_or(ScriptNumError::ArithmeticOverflow)
    }

    pub fn checked_abs(self) -> Result<Self, ScriptNumError> {
        self.0.checked_abs().map(Self).ok_or(ScriptNumError::ArithmeticOverflow)
    }

    /// The value clamped to the `i32` range.
    pub fn to_i32_saturating(self) -> i32 {
        self.0.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

impl From<i64> for ScriptNum {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ScriptNum> for i64 {
    fn from(num: ScriptNum) -> Self {
        num.0
    }
}

impl fmt::Debug for ScriptNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptNum({})", self.0)
    }
}

impl fmt::Display for ScriptNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Check the most significant byte is not a redundant zero or lone sign byte.
pub fn is_minimally_encoded(bytes: &[u8]) -> bool {
    match bytes {
        [] => true,
        [.., last] if last & 0x7f != 0 => true,
        // A zero or sign-only last byte is needed only when the byte before it uses the high bit
        [.., prev, _] => prev & 0x80 != 0,
        [_] => false,
    }
}

fn encode_i64(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut abs = value.unsigned_abs();
    let mut result = Vec::with_capacity(9);
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    // The sign bit goes into the most significant byte, add an extra byte if it is taken.
    match result.last_mut() {
        Some(last) if *last & 0x80 != 0 => result.push(if negative { 0x80 } else { 0x00 }),
        Some(last) if negative => *last |= 0x80,
        _ => (),
    }
    result
}

/// Interpret a stack item as a boolean. Any non-zero value is true, negative zero is false.
pub fn read_scriptbool(item: &[u8]) -> bool {
    match item.split_last() {
        Some((&last, rest)) => !((last & !0x80) == 0x00 && rest.iter().all(|x| *x == 0x00)),
        None => false,
    }
}
