//! Shared implementation of fixed-width little-endian hash types.

/// Declares a fixed-size hash newtype stored little-endian, displayed
/// big-endian with a `0x` prefix and ordered from its most significant byte.
macro_rules! fixed_hash {
    ($(#[$meta:meta])* $name:ident, $size:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name([u8; $size]);

        impl $name {
            /// Width in bytes.
            pub const LENGTH: usize = $size;

            #[inline]
            #[must_use]
            pub const fn zero() -> Self {
                Self([0u8; $size])
            }

            #[inline]
            #[must_use]
            pub const fn from_array(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            #[inline]
            #[must_use]
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|byte| *byte == 0)
            }

            /// Builds a value from exactly `LENGTH` little-endian bytes.
            pub fn from_bytes(value: &[u8]) -> $crate::PrimitiveResult<Self> {
                let bytes: [u8; $size] =
                    value
                        .try_into()
                        .map_err(|_| $crate::PrimitiveError::InvalidLength {
                            expected: $size,
                            actual: value.len(),
                        })?;
                Ok(Self(bytes))
            }

            #[inline]
            #[must_use]
            pub fn to_array(&self) -> [u8; $size] {
                self.0
            }

            #[inline]
            #[must_use]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Parses the big-endian hex form, with or without a `0x` prefix.
            pub fn parse(s: &str) -> $crate::PrimitiveResult<Self> {
                let digits = s
                    .strip_prefix("0x")
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(s);
                if digits.len() != $size * 2 {
                    return Err($crate::PrimitiveError::invalid_format(format!(
                        "expected {} hex digits, got {}",
                        $size * 2,
                        digits.len()
                    )));
                }
                let mut bytes = hex::decode(digits)
                    .map_err(|err| $crate::PrimitiveError::invalid_format(err.to_string()))?;
                bytes.reverse();
                Self::from_bytes(&bytes)
            }

            #[must_use]
            pub fn to_hex_string(&self) -> String {
                let mut bytes = self.0;
                bytes.reverse();
                format!("0x{}", hex::encode(bytes))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.0.iter().rev().cmp(other.0.iter().rev())
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex_string())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex_string())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<[u8; $size]> for $name {
            fn from(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = $crate::PrimitiveError;

            fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
                Self::from_bytes(value)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}
