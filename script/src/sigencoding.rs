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

//! Encoding rules for signatures and public keys consumed by the signature opcodes.

use crate::error::ScriptError;
use crate::flags::{ScriptFlag, ScriptFlags};
use utils::ensure;

pub const SIGHASH_ALL: u8 = 1;
pub const SIGHASH_NONE: u8 = 2;
pub const SIGHASH_SINGLE: u8 = 3;
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Strict DER check of a signature followed by its hash type byte.
///
/// Layout: `0x30 [total-len] 0x02 [R-len] [R] 0x02 [S-len] [S] [sighash]`, with both integers
/// positive and without excess padding.
pub fn is_valid_signature_encoding(sig: &[u8]) -> bool {
    // Minimum and maximum size with one byte integers and 33 byte integers respectively
    if sig.len() < 9 || sig.len() > 73 {
        return false;
    }
    if sig[0] != 0x30 || sig[1] as usize != sig.len() - 3 {
        return false;
    }

    let len_r = sig[3] as usize;
    if 5 + len_r >= sig.len() {
        return false;
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != sig.len() {
        return false;
    }

    let is_valid_integer = |marker: u8, int: &[u8]| match int {
        [] => false,
        _ if marker != 0x02 => false,
        // Negative
        [first, ..] if first & 0x80 != 0 => false,
        // Zero padding only allowed to keep the value positive
        [0x00, second, ..] => second & 0x80 != 0,
        _ => true,
    };

    is_valid_integer(sig[2], &sig[4..4 + len_r])
        && is_valid_integer(sig[4 + len_r], &sig[6 + len_r..6 + len_r + len_s])
}

/// The hash type byte is one of ALL, NONE or SINGLE, optionally combined with ANYONECANPAY.
pub fn is_defined_hashtype_signature(sig: &[u8]) -> bool {
    match sig.last() {
        Some(hash_type) => {
            (SIGHASH_ALL..=SIGHASH_SINGLE).contains(&(hash_type & !SIGHASH_ANYONECANPAY))
        }
        None => false,
    }
}

fn is_low_der_signature(sig: &[u8]) -> Result<(), ScriptError> {
    ensure!(is_valid_signature_encoding(sig), ScriptError::SigDer);
    let der = &sig[..sig.len() - 1];
    ensure!(crypto::key::is_low_s_signature(der), ScriptError::SigHighS);
    Ok(())
}

/// Public key is compressed (33 bytes, 0x02 or 0x03 prefix) or uncompressed (65 bytes, 0x04
/// prefix). The point itself is not validated.
pub fn is_compressed_or_uncompressed_pubkey(pubkey: &[u8]) -> bool {
    match pubkey {
        [0x02 | 0x03, rest @ ..] => rest.len() == 32,
        [0x04, rest @ ..] => rest.len() == 64,
        _ => false,
    }
}

/// Check the signature encoding rules enabled by the flags.
///
/// An empty signature always passes, it is a compact way to provide an invalid signature for
/// use with `CHECK(MULTI)SIG`.
pub fn check_signature_encoding(sig: &[u8], flags: ScriptFlags) -> Result<(), ScriptError> {
    if sig.is_empty() {
        return Ok(());
    }
    let strict_der = ScriptFlag::DerSig | ScriptFlag::LowS | ScriptFlag::StrictEnc;
    if flags.intersects(strict_der) && !is_valid_signature_encoding(sig) {
        return Err(ScriptError::SigDer);
    }
    if flags.contains(ScriptFlag::LowS) {
        is_low_der_signature(sig)?;
    }
    if flags.contains(ScriptFlag::StrictEnc) && !is_defined_hashtype_signature(sig) {
        return Err(ScriptError::SigHashType);
    }
    Ok(())
}

/// Check the public key encoding rules enabled by the flags.
pub fn check_pubkey_encoding(pubkey: &[u8], flags: ScriptFlags) -> Result<(), ScriptError> {
    ensure!(
        !flags.contains(ScriptFlag::StrictEnc) || is_compressed_or_uncompressed_pubkey(pubkey),
        ScriptError::PubkeyType
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;
    use rstest::rstest;

    // A valid low-S signature with SIGHASH_ALL
    const SIG: [u8; 71] = hex!(
        "3044"
        "0220 4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41"
        "0220 181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09"
        "01"
    );

    #[test]
    fn valid_signature() {
        assert!(is_valid_signature_encoding(&SIG));
        assert!(is_defined_hashtype_signature(&SIG));
        assert_eq!(check_signature_encoding(&SIG, ScriptFlags::all()), Ok(()));
    }

    #[rstest]
    #[case::bad_sequence_marker(0, 0x31)]
    #[case::bad_total_len(1, 0x45)]
    #[case::bad_r_marker(2, 0x03)]
    #[case::negative_r(4, 0x80)]
    #[case::bad_s_marker(36, 0x03)]
    #[case::negative_s(38, 0x81)]
    fn invalid_der(#[case] index: usize, #[case] value: u8) {
        let mut sig = SIG;
        sig[index] = value;
        assert!(!is_valid_signature_encoding(&sig));
        assert_eq!(
            check_signature_encoding(&sig, ScriptFlag::DerSig.into()),
            Err(ScriptError::SigDer)
        );
        // Without the flags anything goes
        assert_eq!(check_signature_encoding(&sig, ScriptFlags::empty()), Ok(()));
    }

    #[test]
    fn excess_padding() {
        // R padded with a zero byte although its high bit is clear
        let sig = hex!(
            "3045"
            "0221 00 4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41"
            "0220 181522ec8eca07de4860a4acdd12909d831cc56cbbac4622082221a8768d1d09"
            "01"
        );
        assert!(!is_valid_signature_encoding(&sig));
    }

    #[test]
    fn high_s() {
        // Same signature with S replaced by n - S
        let sig = hex!(
            "3045"
            "0220 4e45e16932b8af514961a1d3a1a25fdf3f4f7732e9d624c6c61548ab5fb8cd41"
            "0221 00e7eadd137135f821b79f5b5322ed6f6137921779f39c5a19b7b03ce459a92438"
            "01"
        );
        assert!(is_valid_signature_encoding(&sig));
        assert_eq!(
            check_signature_encoding(&sig, ScriptFlag::LowS.into()),
            Err(ScriptError::SigHighS)
        );
        assert_eq!(check_signature_encoding(&sig, ScriptFlag::DerSig.into()), Ok(()));
    }

    #[rstest]
    #[case(0x01, true)]
    #[case(0x03, true)]
    #[case(0x81, true)]
    #[case(0x83, true)]
    #[case(0x00, false)]
    #[case(0x04, false)]
    #[case(0x41, false)]
    fn hash_types(#[case] hash_type: u8, #[case] defined: bool) {
        let mut sig = SIG;
        sig[70] = hash_type;
        assert_eq!(is_defined_hashtype_signature(&sig), defined);
        let expected = if defined { Ok(()) } else { Err(ScriptError::SigHashType) };
        assert_eq!(check_signature_encoding(&sig, ScriptFlag::StrictEnc.into()), expected);
    }

    #[test]
    fn empty_signature_passes() {
        assert_eq!(check_signature_encoding(&[], ScriptFlags::all()), Ok(()));
    }

    #[test]
    fn pubkey_types() {
        assert!(is_compressed_or_uncompressed_pubkey(&[0x02; 33]));
        assert!(is_compressed_or_uncompressed_pubkey(&[&[0x04u8][..], &[0u8; 64][..]].concat()));
        assert!(!is_compressed_or_uncompressed_pubkey(&[0x04; 33]));
        assert!(!is_compressed_or_uncompressed_pubkey(&[]));
        let flags: ScriptFlags = ScriptFlag::StrictEnc.into();
        assert_eq!(check_pubkey_encoding(&[0x05; 33], flags), Err(ScriptError::PubkeyType));
        assert_eq!(check_pubkey_encoding(&[0x05; 33], ScriptFlags::empty()), Ok(()));
    }
}
