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

//! Hash functions used by the script engine and address codec.

use sha2::Digest;

pub type Hash160 = [u8; 20];
pub type Hash256 = [u8; 32];

fn hash<D: Digest, T: AsRef<[u8]>>(in_bytes: T) -> sha2::digest::Output<D> {
    let mut hasher = D::new();
    hasher.update(in_bytes);
    hasher.finalize()
}

pub fn sha1(data: impl AsRef<[u8]>) -> [u8; 20] {
    hash::<sha1::Sha1, _>(data).into()
}

pub fn sha256(data: impl AsRef<[u8]>) -> Hash256 {
    hash::<sha2::Sha256, _>(data).into()
}

pub fn ripemd160(data: impl AsRef<[u8]>) -> Hash160 {
    hash::<ripemd::Ripemd160, _>(data).into()
}

/// RIPEMD160 of SHA256. Used for key and script identifiers.
pub fn hash160(data: impl AsRef<[u8]>) -> Hash160 {
    ripemd160(sha256(data))
}

/// Double SHA256. Used for base58 checksums.
pub fn hash256(data: impl AsRef<[u8]>) -> Hash256 {
    sha256(sha256(data))
}

/// Incremental double SHA256 hasher.
#[derive(Clone, Default)]
pub struct StreamHasher256 {
    hasher: sha2::Sha256,
}

impl StreamHasher256 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write<T: AsRef<[u8]>>(&mut self, in_bytes: T) -> &mut Self {
        self.hasher.update(in_bytes);
        self
    }

    pub fn finalize(&mut self) -> Hash256 {
        let first: Hash256 = self.hasher.finalize_reset().into();
        sha256(first)
    }
}
