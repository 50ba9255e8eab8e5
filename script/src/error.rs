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

use crate::num::ScriptNumError;

/// Script evaluation and verification errors.
///
/// Variants split into two families, see [ScriptError::is_structural]. Structural errors mean
/// the script or its inputs are malformed or break an engine limit. The remaining variants mean
/// the script was well formed but its conditions were not met.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum ScriptError {
    #[error("Script size exceeds the limit")]
    ScriptSize,
    #[error("Push value size exceeds the limit")]
    PushSize,
    #[error("Operation limit exceeded")]
    OpCount,
    #[error("Stack size limit exceeded")]
    StackSize,
    #[error("Signature count negative or greater than pubkey count")]
    SigCount,
    #[error("Pubkey count negative or limit exceeded")]
    PubkeyCount,
    #[error("Script ends in the middle of a data push")]
    TruncatedPush,
    #[error("Opcode missing or not understood")]
    BadOpcode,
    #[error("Attempted to use a disabled opcode")]
    DisabledOpcode,
    #[error("Operation not valid with the current stack size")]
    InvalidStackOperation,
    #[error("Operation not valid with the current altstack size")]
    InvalidAltstackOperation,
    #[error("Invalid OP_IF construction")]
    UnbalancedConditional,
    #[error("Numeric operand error: {0}")]
    Num(#[from] ScriptNumError),
    #[error("Data push larger than necessary")]
    MinimalData,
    #[error("Only non-push operators allowed in signatures")]
    SigPushOnly,
    #[error("Non-canonical DER signature")]
    SigDer,
    #[error("Signature hash type missing or not understood")]
    SigHashType,
    #[error("Non-canonical signature: S value is unnecessarily high")]
    SigHighS,
    #[error("Dummy CHECKMULTISIG argument must be zero")]
    SigNullDummy,
    #[error("Public key is neither compressed or uncompressed")]
    PubkeyType,
    #[error("NOPx reserved for soft-fork upgrades")]
    DiscourageUpgradableNops,

    #[error("Script evaluated without error but finished with a false/empty top stack element")]
    EvalFalse,
    #[error("Signature check failed")]
    SigCheckFailed,
    #[error("OP_RETURN was encountered")]
    OpReturn,
    #[error("Script failed an OP_VERIFY operation")]
    Verify,
    #[error("Script failed an OP_EQUALVERIFY operation")]
    EqualVerify,
    #[error("Script failed an OP_CHECKSIGVERIFY operation")]
    CheckSigVerify,
    #[error("Script failed an OP_CHECKMULTISIGVERIFY operation")]
    CheckMultiSigVerify,
    #[error("Script failed an OP_NUMEQUALVERIFY operation")]
    NumEqualVerify,
    #[error("Negative locktime")]
    NegativeLockTime,
    #[error("Locktime requirement not satisfied")]
    UnsatisfiedLockTime,
    #[error("Script failed an OP_CHECKCOLDSTAKEVERIFY operation")]
    CheckColdStakeVerify,
    #[error("Extra items left on stack after execution")]
    CleanStack,
}

impl ScriptError {
    /// Whether the error stems from a malformed script or a broken engine limit, as opposed to
    /// a well formed script whose conditions were not satisfied.
    pub fn is_structural(&self) -> bool {
        match self {
            ScriptError::ScriptSize
            | ScriptError::PushSize
            | ScriptError::OpCount
            | ScriptError::StackSize
            | ScriptError::SigCount
            | ScriptError::PubkeyCount
            | ScriptError::TruncatedPush
            | ScriptError::BadOpcode
            | ScriptError::DisabledOpcode
            | ScriptError::InvalidStackOperation
            | ScriptError::InvalidAltstackOperation
            | ScriptError::UnbalancedConditional
            | ScriptError::Num(_)
            | ScriptError::MinimalData
            | ScriptError::SigPushOnly
            | ScriptError::SigDer
            | ScriptError::SigHashType
            | ScriptError::SigHighS
            | ScriptError::SigNullDummy
            | ScriptError::PubkeyType
            | ScriptError::DiscourageUpgradableNops => true,

            ScriptError::EvalFalse
            | ScriptError::SigCheckFailed
            | ScriptError::OpReturn
            | ScriptError::Verify
            | ScriptError::EqualVerify
            | ScriptError::CheckSigVerify
            | ScriptError::CheckMultiSigVerify
            | ScriptError::NumEqualVerify
            | ScriptError::NegativeLockTime
            | ScriptError::UnsatisfiedLockTime
            | ScriptError::CheckColdStakeVerify
            | ScriptError::CleanStack => false,
        }
    }

    /// Whether the error is the failure of a signature check, as opposed to a malformed
    /// signature.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            ScriptError::SigCheckFailed
                | ScriptError::CheckSigVerify
                | ScriptError::CheckMultiSigVerify
        )
    }
}

pub type Result<T> = core::result::Result<T, ScriptError>;
