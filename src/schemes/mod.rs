//! Classification schemes
//!
//! Each scheme owns three things: its required elements, its ratio list
//! (declared with [`crate::ratios::ratio_set`]), and its label vocabulary.
//!
//! - `donarummo`: nested decision tree, first match wins
//! - `panta`: flattened rule checklist, last match wins
//! - `kandler`: flattened rule checklist plus group and refractive index
//! - `weber`: ratio table and groups for the pretrained ML model
//!
//! `checklist` holds the ordered rule engine the flattened schemes share.

pub mod checklist;
pub mod donarummo;
pub mod kandler;
pub mod panta;
pub mod weber;

/// A scheme's closed label vocabulary.
pub trait MineralLabel: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Short code written to output tables.
    fn code(self) -> &'static str;

    /// Human-readable mineral name.
    fn mineral(self) -> &'static str;

    /// Every label the scheme can produce.
    fn vocabulary() -> &'static [Self];

    /// Unknown or unclassified outcome.
    fn is_unknown(self) -> bool {
        let code = self.code();
        code == "Unknown" || code.starts_with("U-")
    }
}

/// Declares a label enum with its code and mineral name per variant.
///
/// The variant marked `#[default]` is the state every row starts in.
macro_rules! mineral_classes {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:literal, $mineral:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Label for an output code, if it belongs to this vocabulary.
            pub fn from_code(code: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|c| $crate::schemes::MineralLabel::code(*c) == code)
            }
        }

        impl $crate::schemes::MineralLabel for $name {
            fn code(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            fn mineral(self) -> &'static str {
                match self {
                    $( $name::$variant => $mineral ),+
                }
            }

            fn vocabulary() -> &'static [Self] {
                Self::ALL
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::schemes::MineralLabel::code(*self))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::schemes::MineralLabel::code(*self))
            }
        }
    };
}
pub(crate) use mineral_classes;
