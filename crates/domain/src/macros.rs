//! Macro for implementing Display and FromStr for small string-backed enums
//!
//! Roles, reservation states and storage backends all cross a text boundary
//! (database column, config file, CLI argument). The macro keeps their
//! textual form in one place.
//!
//! # Example
//!
//! ```rust
//! use meetbook_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Seat {
//!     Free,
//!     Taken,
//! }
//!
//! impl_domain_status_conversions!(Seat {
//!     Free => "free",
//!     Taken => "taken",
//! });
//!
//! assert_eq!(Seat::Taken.to_string(), "taken");
//! assert_eq!("FREE".parse::<Seat>().unwrap(), Seat::Free);
//! ```

/// Implements Display and FromStr traits for unit-variant enums
///
/// - Display writes the lowercase string given for each variant
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form of the variant
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
