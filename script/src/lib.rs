// Copyright (c) 2021 RBB S.r.l
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

//! This library implements a transaction script engine largely compatible with Bitcoin script,
//! with extensions for cold staking, zerocoin outputs and smart contract opcodes.
//!
//! Besides the interpreter ([eval_script], [verify_script]), the library classifies locking
//! scripts into standard templates ([standard]), extracts payment destinations
//! ([destination]), encodes and decodes base58check addresses ([address]) and determines
//! wallet ownership of outputs ([ismine]). Signature checking is delegated to an implementation
//! of the [SignatureChecker] trait.
//!
//! ## Example
//!
//! Here is how to create a simple script and run it:
//!
//! ```
//! use script::{eval_script, BaseSignatureChecker, Builder, Stack};
//! use script::flags::ScriptFlags;
//! use script::opcodes::all as opc;
//!
//! // Build a script that calculates 3 + 5.
//! let script = Builder::new()
//!         .push_int(3)
//!         .push_int(5)
//!         .push_opcode(opc::OP_ADD)
//!         .into_script();
//!
//! // Run the interpreter with no signature checking capabilities.
//! let stack = Stack::default();
//! let result = eval_script(stack, &script, ScriptFlags::empty(), &BaseSignatureChecker);
//!
//! // Check if the final stack result is [0x08].
//! let expected = Stack::from(vec![vec![0x08]]);
//! assert_eq!(result, Ok(expected));
//! ```

pub mod address;
pub mod context;
pub mod destination;
mod error;
pub mod flags;
mod interpreter;
pub mod ismine;
pub mod num;
pub mod opcodes;
pub mod script;
pub mod sender;
pub mod sigencoding;
pub mod standard;
mod verify;
#[cfg(test)]
mod test;

#[cfg(feature = "testcontext")]
pub use context::testcontext::TestChecker;
pub use context::{BaseSignatureChecker, SignatureChecker};
pub use error::{Result, ScriptError};
pub use interpreter::{eval_script, Item, Stack};
pub use verify::verify_script;
pub use crate::script::{Builder, Instruction, Instructions, Script};
