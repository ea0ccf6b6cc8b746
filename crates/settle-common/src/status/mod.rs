//! Typed status signals reported by AWS services
//!
//! Every resource domain owns its closed set of status values. Each set is a
//! strum-backed enum with an `Unknown` catch-all so a status the service
//! introduces later is carried through verbatim instead of being coerced
//! into a known value. Waiters treat `Unknown` as "keep waiting".

use std::fmt;

pub mod globalaccelerator;
pub mod memorydb;
pub mod xray;

/// A status value drawn from a resource-type-specific set.
pub trait Signal: Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The wire representation, exactly as the service reports it
    fn as_str(&self) -> &str;

    /// True for a status outside the modelled set
    fn is_unknown(&self) -> bool;
}

/// Declare a status signal enum.
///
/// Generates the enum with a trailing `Unknown(String)` variant, a strum
/// `EnumString` parser that never fails, `Display`, `parse_lossy` and the
/// [`Signal`] impl.
macro_rules! status_signal {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, strum::EnumString)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[strum(serialize = $wire)]
                $variant,
            )+
            /// A status this crate does not model
            #[strum(default)]
            Unknown(String),
        }

        impl $name {
            /// The wire representation of this status
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Unknown(raw) => raw,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $name {
            /// Parse a wire value, keeping anything unmodelled as `Unknown`
            pub fn parse_lossy(raw: &str) -> Self {
                raw.parse()
                    .unwrap_or_else(|_| Self::Unknown(raw.to_string()))
            }
        }

        impl $crate::status::Signal for $name {
            fn as_str(&self) -> &str {
                $name::as_str(self)
            }

            fn is_unknown(&self) -> bool {
                matches!(self, Self::Unknown(_))
            }
        }
    };
}

pub(crate) use status_signal;

#[cfg(test)]
mod tests {
    use super::memorydb::SnapshotStatus;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_value_round_trips_through_display() {
        let status = SnapshotStatus::parse_lossy("available");
        assert_eq!(status, SnapshotStatus::Available);
        assert_eq!(status.to_string(), "available");
        assert!(!status.is_unknown());
    }

    #[test]
    fn test_unknown_value_is_preserved() {
        let status = SnapshotStatus::parse_lossy("copying");
        assert_eq!(status, SnapshotStatus::Unknown("copying".to_string()));
        assert_eq!(status.as_str(), "copying");
        assert!(status.is_unknown());
    }

    #[test]
    fn test_strum_parsers_agree_with_parse_lossy() {
        assert_eq!("available".parse::<SnapshotStatus>(), Ok(SnapshotStatus::Available));
        assert_eq!(
            SnapshotStatus::try_from("copying"),
            Ok(SnapshotStatus::parse_lossy("copying"))
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        // The services report a fixed case; anything else is a different status.
        assert!(SnapshotStatus::parse_lossy("AVAILABLE").is_unknown());
    }

    proptest! {
        #[test]
        fn prop_parse_never_loses_the_raw_value(raw in "[a-zA-Z_-]{0,16}") {
            let status = SnapshotStatus::parse_lossy(raw.as_str());
            prop_assert_eq!(status.as_str(), raw.as_str());
        }
    }
}
