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

//! Script interpreter

use std::{borrow::Cow, cmp, ops::Range};

use crate::{
    context::SignatureChecker,
    error::ScriptError,
    flags::{ScriptFlag, ScriptFlags},
    num::{self, read_scriptbool, ScriptNum, ScriptNumError},
    opcodes,
    script::{
        Builder, Instruction, Script, MAX_OPS_PER_SCRIPT, MAX_PUBKEYS_PER_MULTISIG,
        MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE, MAX_STACK_SIZE,
    },
    sigencoding::{check_pubkey_encoding, check_signature_encoding},
};
use crypto::hash;
use utils::ensure;

/// Item on the data stack.
///
/// The [Cow] type is used to avoid copying data when not necessary. That is often the case with
/// large constants such as public keys and hashes.
pub type Item<'a> = Cow<'a, [u8]>;

/// Interpreter data stack.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stack<'a>(Vec<Item<'a>>);

impl<'a> Stack<'a> {
    /// Get stack length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the items, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.0.iter().map(AsRef::as_ref)
    }

    /// Copy the items out of the stack, bottom first.
    pub fn to_vecs(&self) -> Vec<Vec<u8>> {
        self.iter().map(<[u8]>::to_vec).collect()
    }

    /// Whether the top item is true.
    pub fn top_is_true(&self) -> bool {
        self.0.last().is_some_and(|item| read_scriptbool(item))
    }

    /// Check the stack has at least given number of elements and return the length.
    fn at_least(&self, num: usize) -> crate::Result<usize> {
        Some(self.len()).filter(|&l| l >= num).ok_or(ScriptError::InvalidStackOperation)
    }

    /// Pop an item off of the stack.
    pub fn pop(&mut self) -> crate::Result<Item<'a>> {
        self.0.pop().ok_or(ScriptError::InvalidStackOperation)
    }

    /// Pop an item of the top of the stack and convert it to bool.
    fn pop_bool(&mut self) -> crate::Result<bool> {
        Ok(read_scriptbool(&self.pop()?))
    }

    /// Pop an item off the stack and convert it to a number.
    fn pop_num(&mut self, require_minimal: bool) -> crate::Result<ScriptNum> {
        let item = self.pop()?;
        Ok(ScriptNum::decode(&item, require_minimal, num::DEFAULT_MAX_NUM_SIZE)?)
    }

    /// Push an item onto the stack.
    pub fn push(&mut self, item: Item<'a>) {
        self.0.push(item)
    }

    /// Push a boolean item onto the stack.
    fn push_bool(&mut self, b: bool) {
        self.push_num(ScriptNum::new(b as i64));
    }

    /// Push a number onto the stack.
    fn push_num(&mut self, x: ScriptNum) {
        self.push(x.encode().into());
    }

    /// Get an element at given position from the top of the stack.
    pub fn top(&self, idx: usize) -> crate::Result<&Item<'a>> {
        self.at_least(idx + 1).map(|len| &self.0[len - idx - 1])
    }

    /// Map range counting from the top of the stack to the internal vector indexing.
    fn top_range(&self, r: Range<usize>) -> crate::Result<Range<usize>> {
        self.at_least(r.end).map(|len| (len - r.end)..(len - r.start))
    }

    /// Take a mutable slice of the top of the stack.
    fn top_slice_mut(&mut self, r: Range<usize>) -> crate::Result<&mut [Item<'a>]> {
        let i = self.top_range(r)?;
        Ok(&mut self.0[i])
    }

    /// Drop given number of elements
    fn drop(&mut self, num_drop: usize) -> crate::Result<()> {
        let len = self.at_least(num_drop)?;
        self.0.truncate(len - num_drop);
        Ok(())
    }

    /// Duplicate slice indexed from the top of the stack. The new items are added to the top of
    /// the stack.
    fn dup(&mut self, r: Range<usize>) -> crate::Result<()> {
        self.top_range(r).map(|i| self.0.extend_from_within(i))
    }

    /// Swap the top `n` elements with the next `n` elements on the stack.
    fn swap(&mut self, n: usize) -> crate::Result<()> {
        let (top, next) = self.top_slice_mut(0..(2 * n))?.split_at_mut(n);
        top.swap_with_slice(next);
        Ok(())
    }

    /// Remove `n`-th element, counting from the top of the stack.
    fn remove(&mut self, n: usize) -> crate::Result<Item<'a>> {
        let len = self.at_least(n + 1)?;
        Ok(self.0.remove(len - n - 1))
    }
}

impl<'a> From<Vec<Item<'a>>> for Stack<'a> {
    fn from(items: Vec<Item<'a>>) -> Self {
        Self(items)
    }
}

impl From<Vec<Vec<u8>>> for Stack<'static> {
    fn from(items: Vec<Vec<u8>>) -> Self {
        Self(items.into_iter().map(Cow::Owned).collect())
    }
}

/// Execution stack keeps track of masks of IF/ELSE branches being executed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct ExecStack {
    stack: Vec<bool>,
    num_idle: usize,
}

impl ExecStack {
    /// Push mask onto the stack. Executing: true, not executing: false.
    fn push(&mut self, executing: bool) {
        self.stack.push(executing);
        self.num_idle += (!executing) as usize;
    }

    /// Pop the top item off the stack.
    fn pop(&mut self) -> Option<bool> {
        let executing = self.stack.pop()?;
        self.num_idle -= (!executing) as usize;
        Some(executing)
    }

    /// Check if we are currently executing, i.e. no branch is masked out.
    fn executing(&self) -> bool {
        self.num_idle == 0
    }

    /// Check the execution stack is empty, i.e. we are not inside of a conditional.
    fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Result of a script run that did not fail.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Evaluation<'a> {
    pub stack: Stack<'a>,
    /// The last executed instruction was a signature check that failed, leaving false on the
    /// stack.
    pub ended_with_failed_sig_check: bool,
}

/// Run given script with given initial stack.
///
/// Consumes the stack. Returns either an error or the final stack.
pub fn eval_script<'a, C: SignatureChecker + ?Sized>(
    stack: Stack<'a>,
    script: &'a Script,
    flags: ScriptFlags,
    checker: &C,
) -> crate::Result<Stack<'a>> {
    eval_script_traced(stack, script, flags, checker).map(|eval| eval.stack)
}

pub(crate) fn eval_script_traced<'a, C: SignatureChecker + ?Sized>(
    mut stack: Stack<'a>,
    script: &'a Script,
    flags: ScriptFlags,
    checker: &C,
) -> crate::Result<Evaluation<'a>> {
    ensure!(script.len() <= MAX_SCRIPT_SIZE, ScriptError::ScriptSize);

    let require_minimal = flags.contains(ScriptFlag::MinimalData);
    let mut instr_iter = script.instructions();
    let mut script_code: &[u8] = instr_iter.subscript();
    let mut op_count = 0usize;
    let mut exec_stack = ExecStack::default();
    let mut alt_stack = Stack::<'a>::default();
    let mut failed_sig_check = false;

    while let Some(instr) = instr_iter.next() {
        let instr = instr?;
        let executing = exec_stack.executing();
        failed_sig_check = false;

        if let Some(data) = instr.push_data() {
            ensure!(data.len() <= MAX_SCRIPT_ELEMENT_SIZE, ScriptError::PushSize);
        }

        // Pushes and small integers are not counted
        if instr.opcode() > opcodes::all::OP_16 {
            op_count += 1;
            ensure!(op_count <= MAX_OPS_PER_SCRIPT, ScriptError::OpCount);
        }

        match instr {
            Instruction::PushBytes(_, data) => {
                if executing {
                    ensure!(
                        !require_minimal || instr.is_minimal_push(),
                        ScriptError::MinimalData
                    );
                    stack.push(data.into());
                }
            }
            Instruction::Op(opcode) => match opcode.classify() {
                opcodes::Class::IllegalOp => return Err(ScriptError::BadOpcode),
                opcodes::Class::Disabled => return Err(ScriptError::DisabledOpcode),
                _ if !executing && !is_conditional(opcode) => (),

                opcodes::Class::NoOp => (),
                opcodes::Class::UpgradableNoOp => {
                    ensure!(
                        !flags.contains(ScriptFlag::DiscourageUpgradableNops),
                        ScriptError::DiscourageUpgradableNops
                    );
                }
                opcodes::Class::ReservedOp | opcodes::Class::Zerocoin => {
                    return Err(ScriptError::BadOpcode)
                }
                opcodes::Class::ReturnOp => return Err(ScriptError::OpReturn),
                opcodes::Class::PushNum(x) => stack.push_num(ScriptNum::new(x as i64)),
                opcodes::Class::PushBytes(_) | opcodes::Class::PushData(_) => {
                    // Decoded as Instruction::PushBytes
                    return Err(ScriptError::BadOpcode);
                }
                opcodes::Class::AltStack(opc) => match opc {
                    opcodes::AltStack::OP_TOALTSTACK => alt_stack.push(stack.pop()?),
                    opcodes::AltStack::OP_FROMALTSTACK => stack.push(
                        alt_stack.pop().map_err(|_| ScriptError::InvalidAltstackOperation)?,
                    ),
                },
                opcodes::Class::Signature(sig_opcode) => {
                    let success = match sig_opcode {
                        opcodes::Signature::OP_CHECKSIG | opcodes::Signature::OP_CHECKSIGVERIFY => {
                            check_sig(&mut stack, script_code, flags, checker)?
                        }
                        opcodes::Signature::OP_CHECKMULTISIG
                        | opcodes::Signature::OP_CHECKMULTISIGVERIFY => check_multisig(
                            &mut stack,
                            script_code,
                            flags,
                            checker,
                            &mut op_count,
                        )?,
                    };
                    if sig_opcode.is_verify() {
                        let error = match sig_opcode {
                            opcodes::Signature::OP_CHECKSIGVERIFY => ScriptError::CheckSigVerify,
                            _ => ScriptError::CheckMultiSigVerify,
                        };
                        ensure!(success, error);
                    } else {
                        stack.push_bool(success);
                        failed_sig_check = !success;
                    }
                }
                opcodes::Class::ControlFlow(cf) => match cf {
                    opcodes::ControlFlow::OP_CODESEPARATOR => {
                        script_code = instr_iter.subscript();
                    }
                    opcodes::ControlFlow::OP_IF | opcodes::ControlFlow::OP_NOTIF => {
                        let cond = executing && {
                            let cond = stack
                                .pop_bool()
                                .map_err(|_| ScriptError::UnbalancedConditional)?;
                            cond ^ (cf == opcodes::ControlFlow::OP_NOTIF)
                        };
                        exec_stack.push(cond);
                    }
                    opcodes::ControlFlow::OP_ELSE => {
                        let top_executing =
                            exec_stack.pop().ok_or(ScriptError::UnbalancedConditional)?;
                        exec_stack.push(!top_executing);
                    }
                    opcodes::ControlFlow::OP_ENDIF => {
                        let _ = exec_stack.pop().ok_or(ScriptError::UnbalancedConditional)?;
                    }
                },
                opcodes::Class::TimeLock => {
                    if flags.contains(ScriptFlag::CheckLockTimeVerify) {
                        check_lock_time(&stack, require_minimal, checker)?;
                    } else {
                        // Plain OP_NOP2
                        ensure!(
                            !flags.contains(ScriptFlag::DiscourageUpgradableNops),
                            ScriptError::DiscourageUpgradableNops
                        );
                    }
                }
                opcodes::Class::ColdStake => {
                    ensure!(
                        checker.check_cold_stake(script),
                        ScriptError::CheckColdStakeVerify
                    );
                }
                opcodes::Class::Contract(opcodes::Contract::OP_SENDER) => {
                    ensure!(flags.contains(ScriptFlag::OutputSender), ScriptError::BadOpcode);
                }
                opcodes::Class::Contract(_) => {
                    // Contract execution is handled outside of the script engine
                    return Ok(Evaluation {
                        stack,
                        ended_with_failed_sig_check: false,
                    });
                }
                opcodes::Class::Ordinary(opcode) => {
                    execute_opcode(opcode, &mut stack, require_minimal)?;
                }
            },
        }

        ensure!(
            (stack.len() + alt_stack.len()) <= MAX_STACK_SIZE,
            ScriptError::StackSize
        );
    }

    // Check OP_IF/OP_NOTIF has been closed properly with OP_ENDIF.
    ensure!(exec_stack.is_empty(), ScriptError::UnbalancedConditional);

    Ok(Evaluation {
        stack,
        ended_with_failed_sig_check: failed_sig_check,
    })
}

/// Conditionals are processed even in branches that are not executed to track nesting.
fn is_conditional(opcode: opcodes::All) -> bool {
    use opcodes::all::*;
    matches!(opcode, OP_IF | OP_NOTIF | OP_ELSE | OP_ENDIF)
}

/// Script code with all occurrences of the pushed signature removed.
fn script_code_without_sig(script_code: &[u8], sig: &[u8]) -> Script {
    let sig_push = Builder::new().push_slice(sig).into_script();
    Script::from(script_code).delete_all(sig_push.as_bytes()).0
}

fn check_sig<C: SignatureChecker + ?Sized>(
    stack: &mut Stack<'_>,
    script_code: &[u8],
    flags: ScriptFlags,
    checker: &C,
) -> crate::Result<bool> {
    stack.at_least(2)?;
    let pubkey = stack.pop()?;
    let sig = stack.pop()?;

    let script_code = script_code_without_sig(script_code, &sig);
    check_signature_encoding(&sig, flags)?;
    check_pubkey_encoding(&pubkey, flags)?;

    Ok(checker.check_sig(&sig, &pubkey, &script_code))
}

/// Check an m-of-n multisig. Signatures have to be in the same order as their public keys.
///
/// Stack layout, top first: `n <pubkey>*n m <sig>*m <dummy>`.
fn check_multisig<C: SignatureChecker + ?Sized>(
    stack: &mut Stack<'_>,
    script_code: &[u8],
    flags: ScriptFlags,
    checker: &C,
    op_count: &mut usize,
) -> crate::Result<bool> {
    let require_minimal = flags.contains(ScriptFlag::MinimalData);
    let read_count = |item: &[u8]| -> crate::Result<i64> {
        let count = ScriptNum::decode(item, require_minimal, num::DEFAULT_MAX_NUM_SIZE)?;
        Ok(count.to_i32_saturating() as i64)
    };

    let nkeys = read_count(stack.top(0)?)?;
    ensure!(
        (0..=MAX_PUBKEYS_PER_MULTISIG as i64).contains(&nkeys),
        ScriptError::PubkeyCount
    );
    let nkeys = nkeys as usize;
    *op_count += nkeys;
    ensure!(*op_count <= MAX_OPS_PER_SCRIPT, ScriptError::OpCount);

    let nsigs = read_count(stack.top(nkeys + 1)?)?;
    ensure!((0..=nkeys as i64).contains(&nsigs), ScriptError::SigCount);
    let nsigs = nsigs as usize;

    // Keys occupy positions 1..=nkeys, signatures follow after the signature count and the
    // dummy element sits right below them.
    let dummy_pos = nkeys + nsigs + 2;
    stack.at_least(dummy_pos + 1)?;

    let sigs: Vec<&[u8]> = (0..nsigs)
        .map(|i| stack.top(nkeys + 2 + i).map(|item| &item[..]))
        .collect::<Result<_, _>>()?;
    let script_code = sigs.iter().fold(Script::from(script_code), |code, sig| {
        let sig_push = Builder::new().push_slice(sig).into_script();
        code.delete_all(sig_push.as_bytes()).0
    });

    let mut success = true;
    let (mut isig, mut ikey) = (0usize, 0usize);
    let (mut sigs_left, mut keys_left) = (nsigs, nkeys);
    while success && sigs_left > 0 {
        let sig = stack.top(nkeys + 2 + isig)?;
        let pubkey = stack.top(1 + ikey)?;

        check_signature_encoding(sig, flags)?;
        check_pubkey_encoding(pubkey, flags)?;

        if checker.check_sig(sig, pubkey, &script_code) {
            isig += 1;
            sigs_left -= 1;
        }
        ikey += 1;
        keys_left -= 1;

        // Not enough keys left to cover the remaining signatures
        if sigs_left > keys_left {
            success = false;
        }
    }

    stack.drop(dummy_pos)?;
    ensure!(
        !flags.contains(ScriptFlag::NullDummy) || stack.top(0)?.is_empty(),
        ScriptError::SigNullDummy
    );
    stack.drop(1)?;

    Ok(success)
}

fn check_lock_time<C: SignatureChecker + ?Sized>(
    stack: &Stack<'_>,
    require_minimal: bool,
    checker: &C,
) -> crate::Result<()> {
    // The operand is left on the stack, it is typically followed by OP_DROP.
    let lock_time = ScriptNum::decode(stack.top(0)?, require_minimal, num::LOCKTIME_MAX_NUM_SIZE)?;
    ensure!(lock_time.value() >= 0, ScriptError::NegativeLockTime);
    ensure!(
        checker.check_locktime(lock_time),
        ScriptError::UnsatisfiedLockTime
    );
    Ok(())
}

/// Execute an ["ordinary"](opcodes::Ordinary) opcode.
fn execute_opcode(
    opcode: opcodes::Ordinary,
    stack: &mut Stack<'_>,
    require_minimal: bool,
) -> crate::Result<()> {
    use opcodes::Ordinary as Opc;

    let num = |b: bool| ScriptNum::new(b as i64);

    match opcode {
        // Verify. Do nothing now, the actual verification is handled below this match statement.
        Opc::OP_VERIFY => (),

        // Main stack manipulation
        Opc::OP_DROP => stack.drop(1)?,
        Opc::OP_2DROP => stack.drop(2)?,
        Opc::OP_DUP => stack.dup(0..1)?,
        Opc::OP_2DUP => stack.dup(0..2)?,
        Opc::OP_3DUP => stack.dup(0..3)?,
        Opc::OP_OVER => stack.dup(1..2)?,
        Opc::OP_2OVER => stack.dup(2..4)?,
        Opc::OP_SWAP => stack.swap(1)?,
        Opc::OP_2SWAP => stack.swap(2)?,
        Opc::OP_2ROT => {
            let top = stack.top_slice_mut(0..6)?;
            top.rotate_left(2);
        }
        Opc::OP_NIP => {
            let _ = stack.remove(1)?;
        }
        Opc::OP_PICK | Opc::OP_ROLL => {
            let n = stack.pop_num(require_minimal)?.to_i32_saturating();
            ensure!(
                n >= 0 && (n as usize) < stack.len(),
                ScriptError::InvalidStackOperation
            );
            let item = if opcode == Opc::OP_PICK {
                stack.top(n as usize)?.clone()
            } else {
                stack.remove(n as usize)?
            };
            stack.push(item);
        }
        Opc::OP_ROT => {
            let x = stack.remove(2)?;
            stack.push(x);
        }
        Opc::OP_TUCK => {
            let x = stack.top(0)?.clone();
            stack.swap(1)?;
            stack.push(x);
        }
        Opc::OP_IFDUP => {
            let item = stack.top(0)?;
            if read_scriptbool(item) {
                let item_clone = item.clone();
                stack.push(item_clone);
            }
        }
        Opc::OP_DEPTH => stack.push_num(ScriptNum::new(stack.len() as i64)),

        // Stack item queries
        Opc::OP_SIZE => {
            let top_len = stack.top(0)?.len();
            stack.push_num(ScriptNum::new(top_len as i64));
        }
        Opc::OP_EQUAL | Opc::OP_EQUALVERIFY => {
            stack.at_least(2)?;
            let y = stack.pop()?;
            let x = stack.pop()?;
            stack.push_bool(x == y);
        }

        // Arithmetic
        Opc::OP_1ADD => op_num1(stack, require_minimal, |x| x.checked_add(ScriptNum::new(1)))?,
        Opc::OP_1SUB => op_num1(stack, require_minimal, |x| x.checked_sub(ScriptNum::new(1)))?,
        Opc::OP_NEGATE => op_num1(stack, require_minimal, ScriptNum::checked_neg)?,
        Opc::OP_ABS => op_num1(stack, require_minimal, ScriptNum::checked_abs)?,
        Opc::OP_NOT => op_num1(stack, require_minimal, |x| Ok(num(x.value() == 0)))?,
        Opc::OP_0NOTEQUAL => op_num1(stack, require_minimal, |x| Ok(num(x.value() != 0)))?,
        Opc::OP_ADD => op_num2(stack, require_minimal, ScriptNum::checked_add)?,
        Opc::OP_SUB => op_num2(stack, require_minimal, ScriptNum::checked_sub)?,
        Opc::OP_BOOLAND => op_num2(stack, require_minimal, |x, y| {
            Ok(num(x.value() != 0 && y.value() != 0))
        })?,
        Opc::OP_BOOLOR => op_num2(stack, require_minimal, |x, y| {
            Ok(num(x.value() != 0 || y.value() != 0))
        })?,
        Opc::OP_NUMEQUAL | Opc::OP_NUMEQUALVERIFY => {
            op_num2(stack, require_minimal, |x, y| Ok(num(x == y)))?
        }
        Opc::OP_NUMNOTEQUAL => op_num2(stack, require_minimal, |x, y| Ok(num(x != y)))?,
        Opc::OP_LESSTHAN => op_num2(stack, require_minimal, |x, y| Ok(num(x < y)))?,
        Opc::OP_GREATERTHAN => op_num2(stack, require_minimal, |x, y| Ok(num(x > y)))?,
        Opc::OP_LESSTHANOREQUAL => op_num2(stack, require_minimal, |x, y| Ok(num(x <= y)))?,
        Opc::OP_GREATERTHANOREQUAL => op_num2(stack, require_minimal, |x, y| Ok(num(x >= y)))?,
        Opc::OP_MIN => op_num2(stack, require_minimal, |x, y| Ok(cmp::min(x, y)))?,
        Opc::OP_MAX => op_num2(stack, require_minimal, |x, y| Ok(cmp::max(x, y)))?,
        Opc::OP_WITHIN => {
            stack.at_least(3)?;
            let hi = stack.pop_num(require_minimal)?;
            let lo = stack.pop_num(require_minimal)?;
            let x = stack.pop_num(require_minimal)?;
            stack.push_bool(lo <= x && x < hi);
        }

        // Hashes
        Opc::OP_RIPEMD160 => op_hash(stack, |x| hash::ripemd160(x))?,
        Opc::OP_SHA1 => op_hash(stack, |x| hash::sha1(x))?,
        Opc::OP_SHA256 => op_hash(stack, |x| hash::sha256(x))?,
        Opc::OP_HASH160 => op_hash(stack, |x| hash::hash160(x))?,
        Opc::OP_HASH256 => op_hash(stack, |x| hash::hash256(x))?,
    }

    if opcode.is_verify() && !stack.pop_bool()? {
        return Err(match opcode {
            Opc::OP_EQUALVERIFY => ScriptError::EqualVerify,
            Opc::OP_NUMEQUALVERIFY => ScriptError::NumEqualVerify,
            _ => ScriptError::Verify,
        });
    }
    Ok(())
}

/// Perform an unary arithmetic operation on the top of the stack.
fn op_num1(
    stack: &mut Stack,
    require_minimal: bool,
    f: impl FnOnce(ScriptNum) -> Result<ScriptNum, ScriptNumError>,
) -> crate::Result<()> {
    let x = stack.pop_num(require_minimal)?;
    stack.push_num(f(x)?);
    Ok(())
}

/// Perform a binary arithmetic operation on the top of the stack.
fn op_num2(
    stack: &mut Stack,
    require_minimal: bool,
    f: impl FnOnce(ScriptNum, ScriptNum) -> Result<ScriptNum, ScriptNumError>,
) -> crate::Result<()> {
    stack.at_least(2)?;
    let y = stack.pop_num(require_minimal)?;
    let x = stack.pop_num(require_minimal)?;
    stack.push_num(f(x, y)?);
    Ok(())
}

/// Perform a byte-array based function on the top stack item. Useful for hashes.
fn op_hash<T: AsRef<[u8]>>(stack: &mut Stack, f: impl FnOnce(&[u8]) -> T) -> crate::Result<()> {
    let result = f(&stack.pop()?);
    stack.push(Cow::Owned(result.as_ref().to_vec()));
    Ok(())
}
