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

//! Logging facade for the workspace.
//!
//! Library crates log through the re-exported [log] macros. Binaries and tests that want to see
//! the output call [init_logging] once, the filter is taken from the `RUST_LOG` environment
//! variable.

pub use log;

static INITIALIZE_LOGGER_ONCE_FLAG: std::sync::Once = std::sync::Once::new();

/// Install the terminal logger. Calling this more than once is harmless.
pub fn init_logging() {
    INITIALIZE_LOGGER_ONCE_FLAG.call_once(|| {
        // Tests may race with other loggers installed by the harness
        let _ = env_logger::builder().is_test(cfg!(test)).try_init();
    });
}

/// Log target used by the script engine, mirrors the debug category of the node.
pub const SCRIPT_LOG_TARGET: &str = "script";
