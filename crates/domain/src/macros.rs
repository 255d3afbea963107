//! Macro for implementing Display and FromStr for wire-name enums
//!
//! Enums that travel over the wire or through configuration (backend names,
//! HTTP verbs) share one canonical spelling for both directions. Parsing is
//! case-insensitive.
//!
//! # Example
//!
//! ```rust
//! use paywire_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Mode {
//!     Live,
//!     Test,
//! }
//!
//! impl_wire_name_conversions!(Mode {
//!     Live => "live",
//!     Test => "test",
//! });
//!
//! assert_eq!(Mode::Live.to_string(), "live");
//! assert_eq!("TEST".parse::<Mode>(), Ok(Mode::Test));
//! ```

/// Implements `as_str`, Display and FromStr for wire-name enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their canonical names
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire name of this variant.
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

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Verb {
        Get,
        Post,
    }

    impl_wire_name_conversions!(Verb {
        Get => "GET",
        Post => "POST",
    });

    #[test]
    fn display_uses_canonical_spelling() {
        assert_eq!(Verb::Get.to_string(), "GET");
        assert_eq!(Verb::Post.as_str(), "POST");
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!(Verb::from_str("get").unwrap(), Verb::Get);
        assert_eq!(Verb::from_str(" Post ").unwrap(), Verb::Post);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = Verb::from_str("PATCH").unwrap_err();
        assert!(err.contains("Invalid Verb: PATCH"));
    }
}
