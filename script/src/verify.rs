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

//! Verification of an unlocking script against a locking script.

use logging::{log, SCRIPT_LOG_TARGET};
use utils::ensure;

use crate::context::SignatureChecker;
use crate::error::ScriptError;
use crate::flags::{ScriptFlag, ScriptFlags};
use crate::interpreter::{eval_script, eval_script_traced, Evaluation, Stack};
use crate::script::Script;

/// Check the evaluation left a true value on top of the stack.
fn ensure_true(eval: &Evaluation<'_>) -> crate::Result<()> {
    if eval.stack.top_is_true() {
        Ok(())
    } else if eval.ended_with_failed_sig_check {
        Err(ScriptError::SigCheckFailed)
    } else {
        Err(ScriptError::EvalFalse)
    }
}

fn verify_inner<C: SignatureChecker + ?Sized>(
    script_sig: &Script,
    script_pubkey: &Script,
    flags: ScriptFlags,
    checker: &C,
) -> crate::Result<()> {
    let p2sh = flags.contains(ScriptFlag::P2sh) && script_pubkey.is_pay_to_script_hash();

    ensure!(
        !flags.contains(ScriptFlag::SigPushOnly) || script_sig.is_push_only(),
        ScriptError::SigPushOnly
    );

    let stack = eval_script(Stack::default(), script_sig, flags, checker)?;
    let snapshot = p2sh.then(|| stack.clone());

    let eval = eval_script_traced(stack, script_pubkey, flags, checker)?;
    ensure_true(&eval)?;

    let final_stack_len = match snapshot {
        Some(mut stack) => {
            // Only pushes may produce the redeem script
            ensure!(script_sig.is_push_only(), ScriptError::SigPushOnly);

            let redeem_script = Script::from(stack.pop()?.into_owned());
            let eval = eval_script_traced(stack, &redeem_script, flags, checker)?;
            ensure_true(&eval)?;
            eval.stack.len()
        }
        None => eval.stack.len(),
    };

    if flags.contains(ScriptFlag::CleanStack) {
        // A clean stack can only be judged once redeem scripts are unwrapped
        ensure!(
            flags.contains(ScriptFlag::P2sh) && final_stack_len == 1,
            ScriptError::CleanStack
        );
    }

    Ok(())
}

/// Verify `script_sig` satisfies `script_pubkey` under given flags.
///
/// The unlocking script is evaluated first, the resulting stack is then used to evaluate the
/// locking script. With [ScriptFlag::P2sh], the redeem script of a pay to script hash output is
/// evaluated as well.
pub fn verify_script<C: SignatureChecker + ?Sized>(
    script_sig: &Script,
    script_pubkey: &Script,
    flags: ScriptFlags,
    checker: &C,
) -> crate::Result<()> {
    verify_inner(script_sig, script_pubkey, flags, checker).inspect_err(|e| {
        if e.is_structural() {
            log::debug!(
                target: SCRIPT_LOG_TARGET,
                "Malformed script rejected: {e}, locking script {script_pubkey:?}"
            );
        }
    })
}
