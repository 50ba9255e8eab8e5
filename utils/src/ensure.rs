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

//! Tools for interrupting function flow unless some condition holds.

/// Early exit if given condition is not satisfied.
///
/// There are two variants:
/// * `ensure!(cond)` returns from the enclosing function with [`None`] if `cond` fails
/// * `ensure!(cond, err)` returns from the function with [`Err`]`(err)` if `cond` fails
///
/// Example with [Option]:
/// ```
/// # use utils::ensure;
/// fn small_int(opcode: u8) -> Option<u8> {
///     ensure!((0x51..=0x60).contains(&opcode));
///     Some(opcode - 0x50)
/// }
///
/// assert_eq!(small_int(0x51), Some(1));
/// assert_eq!(small_int(0x60), Some(16));
/// assert_eq!(small_int(0x61), None);
/// ```
///
/// Example with [Result]:
/// ```
/// # use utils::ensure;
/// # #[derive(PartialEq, Eq, Debug)]
/// enum PushError {
///     Empty,
///     TooLarge,
/// }
///
/// fn check_push(data: &[u8]) -> Result<usize, PushError> {
///     ensure!(!data.is_empty(), PushError::Empty);
///     ensure!(data.len() <= 520, PushError::TooLarge);
///     Ok(data.len())
/// }
///
/// assert_eq!(check_push(&[1, 2, 3]), Ok(3));
/// assert_eq!(check_push(&[]), Err(PushError::Empty));
/// assert_eq!(check_push(&[0; 521]), Err(PushError::TooLarge));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        $cond.then_some(())?
    };
    ($cond:expr, $err:expr $(,)?) => {
        $cond.then_some(()).ok_or_else(|| $err)?
    };
}

/// Function flavour of [ensure!] for use in expression position.
pub mod func_style {
    /// Return `Err` if given condition is not satisfied.
    ///
    /// Maps `true` to `Ok(())`, `false` to `Err(err)`.
    ///
    /// Example:
    /// ```
    /// # use utils::ensure::func_style::*;
    /// fn check_sig_count(nsig: i64, nkey: i64) -> Result<usize, &'static str> {
    ///     ensure(nsig >= 0 && nsig <= nkey, "bad signature count")?;
    ///     Ok(nsig as usize)
    /// }
    ///
    /// assert_eq!(check_sig_count(2, 3), Ok(2));
    /// assert_eq!(check_sig_count(4, 3), Err("bad signature count"));
    /// ```
    #[must_use = "Result of ensure not used. Use the `?` operator for early exit."]
    pub fn ensure<E>(cond: bool, err: E) -> Result<(), E> {
        cond.then_some(()).ok_or(err)
    }
}

#[cfg(test)]
mod test {
    use super::func_style::ensure;

    fn parity(x: u32) -> Result<u32, &'static str> {
        crate::ensure!(x % 2 == 0, "odd");
        Ok(x / 2)
    }

    #[test]
    fn macro_and_function_agree() {
        for x in 0..10u32 {
            assert_eq!(parity(x).is_ok(), ensure(x % 2 == 0, "odd").is_ok());
        }
    }
}
