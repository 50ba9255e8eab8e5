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

//! Base58check text encoding of destinations and secret keys.

use crypto::hash::hash256;
use crypto::key::{PrivateKey, SECRET_KEY_SIZE};

use crate::destination::{Destination, KeyId, ScriptId};

const CHECKSUM_SIZE: usize = 4;
const HASH_SIZE: usize = 20;
/// Trailing marker of a secret key whose public key is used in compressed form.
const COMPRESSED_SECRET_MARKER: u8 = 0x01;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChainType {
    Mainnet,
    Testnet,
    Regtest,
}

/// Kinds of base58 encoded data, each with its own prefix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Base58Type {
    PubkeyAddress,
    ScriptAddress,
    SecretKey,
    StakingAddress,
}

impl ChainType {
    pub const fn name(&self) -> &'static str {
        match self {
            ChainType::Mainnet => "mainnet",
            ChainType::Testnet => "testnet",
            ChainType::Regtest => "regtest",
        }
    }

    pub const fn base58_prefix(&self, base58_type: Base58Type) -> u8 {
        match (self, base58_type) {
            (ChainType::Mainnet, Base58Type::PubkeyAddress) => 30,
            (ChainType::Mainnet, Base58Type::ScriptAddress) => 90,
            (ChainType::Mainnet, Base58Type::SecretKey) => 89,
            (ChainType::Mainnet, Base58Type::StakingAddress) => 63,
            (ChainType::Testnet | ChainType::Regtest, Base58Type::PubkeyAddress) => 139,
            (ChainType::Testnet | ChainType::Regtest, Base58Type::ScriptAddress) => 19,
            (ChainType::Testnet | ChainType::Regtest, Base58Type::SecretKey) => 239,
            (ChainType::Testnet | ChainType::Regtest, Base58Type::StakingAddress) => 73,
        }
    }
}

impl std::str::FromStr for ChainType {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [ChainType::Mainnet, ChainType::Testnet, ChainType::Regtest]
            .into_iter()
            .find(|chain| chain.name() == s)
            .ok_or_else(|| AddressError::UnknownChain(s.to_owned()))
    }
}

#[derive(thiserror::Error, Debug, Eq, PartialEq, Clone)]
pub enum AddressError {
    #[error("Invalid base58 string: {0}")]
    InvalidBase58(String),
    #[error("Base58 checksum mismatch")]
    ChecksumMismatch,
    #[error("Unexpected payload length {0}")]
    InvalidLength(usize),
    #[error("Unknown prefix {0}")]
    UnknownPrefix(u8),
    #[error("No destination to encode")]
    NoDestination,
    #[error("Invalid secret key")]
    InvalidSecretKey,
    #[error("Unknown chain type: {0}")]
    UnknownChain(String),
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let hash = hash256(data);
    [hash[0], hash[1], hash[2], hash[3]]
}

fn encode_base58_check(prefix: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_SIZE);
    data.push(prefix);
    data.extend_from_slice(payload);
    let checksum = checksum(&data);
    data.extend_from_slice(&checksum);
    bs58::encode(data).into_string()
}

/// Decode a base58check string into the prefix byte and the payload.
fn decode_base58_check(s: &str) -> Result<(u8, Vec<u8>), AddressError> {
    let decoded = bs58::decode(s)
        .into_vec()
        .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;
    if decoded.len() < 1 + CHECKSUM_SIZE {
        return Err(AddressError::InvalidLength(decoded.len()));
    }
    let (data, check) = decoded.split_at(decoded.len() - CHECKSUM_SIZE);
    if checksum(data) != check {
        return Err(AddressError::ChecksumMismatch);
    }
    Ok((data[0], data[1..].to_vec()))
}

/// A decoded address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    pub destination: Destination,
    /// The key hash was encoded with the staking prefix.
    pub is_staking: bool,
}

/// Encode a destination. Key hashes use the staking prefix if `is_staking` is set.
pub fn encode_destination(
    destination: &Destination,
    is_staking: bool,
    chain: ChainType,
) -> Result<String, AddressError> {
    match destination {
        Destination::NoDestination => Err(AddressError::NoDestination),
        Destination::KeyHash(id) => {
            let prefix = if is_staking {
                Base58Type::StakingAddress
            } else {
                Base58Type::PubkeyAddress
            };
            Ok(encode_base58_check(chain.base58_prefix(prefix), id.as_bytes()))
        }
        Destination::ScriptHash(id) => Ok(encode_base58_check(
            chain.base58_prefix(Base58Type::ScriptAddress),
            id.as_bytes(),
        )),
    }
}

/// Decode an address of the given chain.
pub fn decode_destination(
    address: &str,
    chain: ChainType,
) -> Result<DecodedAddress, AddressError> {
    let (prefix, payload) = decode_base58_check(address)?;
    if payload.len() != HASH_SIZE {
        return Err(AddressError::InvalidLength(payload.len() + 1));
    }

    let (destination, is_staking) = match prefix {
        p if p == chain.base58_prefix(Base58Type::PubkeyAddress) => {
            (KeyId::from_slice(&payload).into(), false)
        }
        p if p == chain.base58_prefix(Base58Type::StakingAddress) => {
            (KeyId::from_slice(&payload).into(), true)
        }
        p if p == chain.base58_prefix(Base58Type::ScriptAddress) => {
            (ScriptId::from_slice(&payload).into(), false)
        }
        p => return Err(AddressError::UnknownPrefix(p)),
    };

    Ok(DecodedAddress {
        destination,
        is_staking,
    })
}

/// Check the string is an address of the given chain, with the staking prefix exactly when
/// `is_staking` is set.
pub fn is_valid_destination_string(address: &str, is_staking: bool, chain: ChainType) -> bool {
    decode_destination(address, chain).is_ok_and(|decoded| {
        decoded.destination.is_valid() && decoded.is_staking == is_staking
    })
}

pub fn encode_secret(key: &PrivateKey, chain: ChainType) -> String {
    let mut payload = key.secret_bytes().to_vec();
    if key.is_compressed() {
        payload.push(COMPRESSED_SECRET_MARKER);
    }
    encode_base58_check(chain.base58_prefix(Base58Type::SecretKey), &payload)
}

/// Decode a secret key, 32 bytes optionally followed by the compression marker.
pub fn decode_secret(encoded: &str, chain: ChainType) -> Result<PrivateKey, AddressError> {
    let (prefix, payload) = decode_base58_check(encoded)?;
    if prefix != chain.base58_prefix(Base58Type::SecretKey) {
        return Err(AddressError::UnknownPrefix(prefix));
    }
    let compressed = match payload.len() {
        SECRET_KEY_SIZE => false,
        n if n == SECRET_KEY_SIZE + 1 && payload[SECRET_KEY_SIZE] == COMPRESSED_SECRET_MARKER => {
            true
        }
        n => return Err(AddressError::InvalidLength(n + 1)),
    };
    PrivateKey::from_bytes(&payload[..SECRET_KEY_SIZE], compressed)
        .map_err(|_| AddressError::InvalidSecretKey)
}
