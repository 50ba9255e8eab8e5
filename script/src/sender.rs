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

//! Extraction of the sender proof attached to contract outputs.
//!
//! A contract output may carry the script and signature proving who created it:
//!
//! `<sender signature script> <sender pubkey script> <program> OP_SENDER`
//!
//! The proof follows `OP_CREATE` or `OP_CALL` and its parts are taken from the data pushes
//! preceding `OP_SENDER`.

use logging::{log, SCRIPT_LOG_TARGET};

use crate::error::ScriptError;
use crate::opcodes::all as opc;
use crate::script::{Instruction, Script};

#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum SenderError {
    #[error("Script has no OP_SENDER")]
    NoSender,
    #[error("OP_SENDER not preceded by OP_CREATE or OP_CALL")]
    NoContractOpcode,
    #[error("More than one OP_CREATE or OP_CALL in script")]
    MultipleContractOpcodes,
    #[error("OP_SENDER needs 3 preceding pushes, found {0}")]
    TooFewItems(usize),
    #[error("Sender pubkey or signature script is empty")]
    EmptyComponent,
    #[error("Malformed script: {0}")]
    Parse(#[from] ScriptError),
}

/// Sender proof of a contract output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderData {
    /// Locking script of the sender.
    pub pubkey_script: Script,
    /// Unlocking script satisfying `pubkey_script`.
    pub signature_script: Script,
    /// Data pushed right before `OP_SENDER`.
    pub program: Vec<u8>,
}

fn reject(error: SenderError) -> SenderError {
    log::debug!(target: SCRIPT_LOG_TARGET, "Sender data extraction failed: {error}");
    error
}

/// Find the sender proof in a contract output script.
pub fn extract_sender_data(script: &Script) -> Result<SenderData, SenderError> {
    if !script.has_op_sender() {
        return Err(SenderError::NoSender);
    }

    let mut items: Vec<&[u8]> = Vec::new();
    let mut seen_contract = false;

    for instr in script.instructions() {
        let instr = instr.map_err(|e| reject(e.into()))?;

        match instr {
            // Empty explicit length pushes do not reach the stack, only OP_0 does
            Instruction::PushBytes(op, data) => {
                if !data.is_empty() || op == opc::OP_0 {
                    items.push(data);
                }
            }
            Instruction::Op(op) => {
                if let Some(n) = op.small_int() {
                    items.push(&SMALL_INTS[n as usize]);
                }
            }
        }

        match instr.opcode() {
            opc::OP_CREATE | opc::OP_CALL => {
                if seen_contract {
                    return Err(reject(SenderError::MultipleContractOpcodes));
                }
                seen_contract = true;
            }
            opc::OP_SENDER => {
                if !seen_contract {
                    return Err(reject(SenderError::NoContractOpcode));
                }
                let [signature, pubkey, program] = match items.as_slice() {
                    [.., a, b, c] => [*a, *b, *c],
                    _ => return Err(reject(SenderError::TooFewItems(items.len()))),
                };
                if signature.is_empty() || pubkey.is_empty() {
                    return Err(reject(SenderError::EmptyComponent));
                }
                return Ok(SenderData {
                    pubkey_script: pubkey.into(),
                    signature_script: signature.into(),
                    program: program.to_vec(),
                });
            }
            _ => (),
        }
    }

    Err(SenderError::NoSender)
}

/// Stack representation of small integers 1 to 16, index 0 is unused.
static SMALL_INTS: [[u8; 1]; 17] = {
    let mut ints = [[0u8; 1]; 17];
    let mut i = 0;
    while i < 17 {
        ints[i] = [i as u8];
        i += 1;
    }
    ints
};
