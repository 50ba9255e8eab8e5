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

//! Config settings with defaults.

/// Create a newtype wrapping a configuration value together with its default.
///
/// The generated type dereferences to the wrapped value and can be built from it, so a config
/// struct made of such settings can simply derive [Default].
///
/// ```
/// # use utils::make_config_setting;
/// make_config_setting!(MaxPushBytes, usize, 520);
///
/// #[derive(Default)]
/// struct Limits {
///     max_push_bytes: MaxPushBytes,
/// }
///
/// assert_eq!(*Limits::default().max_push_bytes, 520);
/// assert_eq!(*MaxPushBytes::from(80), 80);
/// ```
#[macro_export]
macro_rules! make_config_setting {
    ($name:ident, $tp:ty, $default_value:expr $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            value: $tp,
        }

        impl $name {
            pub fn new(value: $tp) -> Self {
                Self { value }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    value: $default_value,
                }
            }
        }

        impl From<$tp> for $name {
            fn from(value: $tp) -> Self {
                Self { value }
            }
        }

        impl std::ops::Deref for $name {
            type Target = $tp;

            fn deref(&self) -> &Self::Target {
                &self.value
            }
        }
    };
}

#[cfg(test)]
mod test {
    use rstest::rstest;
    use static_assertions::assert_impl_all;

    make_config_setting!(TestFlag, bool, true);
    make_config_setting!(TestLimit, u32, 83);

    assert_impl_all!(TestLimit: Default, Clone, std::fmt::Debug);

    #[test]
    fn defaults() {
        assert!(*TestFlag::default());
        assert_eq!(*TestLimit::default(), 83);
    }

    #[rstest]
    #[case(0)]
    #[case(83)]
    #[case(u32::MAX)]
    fn override_value(#[case] value: u32) {
        assert_eq!(*TestLimit::from(value), value);
        assert_eq!(TestLimit::new(value), TestLimit::from(value));
    }
}
