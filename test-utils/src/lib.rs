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

pub mod random;

/// Get all variants of the bytes with a single bit flipped.
pub fn all_single_bit_mutations(data: &[u8]) -> impl Iterator<Item = Vec<u8>> + '_ {
    (0..(data.len() * 8)).map(move |bit| {
        let (byte, bit) = (bit / 8, bit % 8);
        let mut mutated = data.to_vec();
        mutated[byte] ^= 1u8 << bit;
        mutated
    })
}
