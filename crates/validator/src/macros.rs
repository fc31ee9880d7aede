//! Macros for authoring rules with minimal boilerplate.
//!
//! - [`rule!`]: declare a rule struct and its [`Rule`](crate::plugin::Rule)
//!   implementation over one JSON kind.
//!
//! # Examples
//!
//! ```rust
//! use sift_validator::rule;
//! use sift_validator::plugin::{Outcome, Rule};
//! use serde_json::json;
//!
//! // Unit rule (no fields)
//! rule! {
//!     pub Lowercase for string;
//!     check(input) { !input.chars().any(char::is_uppercase) }
//!     message(input) { "Must be lower case" }
//! }
//!
//! // Struct with fields
//! rule! {
//!     pub AtLeast { min: f64 } for number;
//!     check(self, input) { input >= self.min }
//!     message(self, input) { format!("{input} is below {}", self.min) }
//! }
//!
//! assert!(Lowercase.check(Some(&json!("abc")), &json!(null)).is_valid());
//! assert!(!AtLeast { min: 3.0 }.check(Some(&json!(2)), &json!(null)).is_valid());
//! // Values of another kind are left to the type rule.
//! assert!(AtLeast { min: 3.0 }.check(Some(&json!("x")), &json!(null)).is_valid());
//! ```

// ============================================================================
// RULE MACRO
// ============================================================================

/// Declares a rule: struct definition plus `Rule` implementation.
///
/// The kind after `for` selects what the check receives:
///
/// | kind     | input type                          |
/// |----------|-------------------------------------|
/// | `string` | `&str`                              |
/// | `number` | `f64`                               |
/// | `array`  | `&Vec<Value>`                       |
/// | `object` | `&Map<String, Value>`               |
/// | `any`    | `&Value`                            |
///
/// A value of any other kind, or an absent value, is reported as valid:
/// kind mismatches are the base type rule's job. `#[derive(Debug, Clone)]`
/// is always applied; fields are public so the rule can be built with a
/// struct literal.
#[macro_export]
macro_rules! rule {
    // ── Unit rule (no fields) ─────────────────────────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident for $kind:ident;
        check($inp:ident) $check:block
        message($minp:ident) $msg:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::plugin::Rule for $name {
            #[allow(unused_variables)]
            fn check(
                &self,
                value: ::core::option::Option<&$crate::__private::Value>,
                root: &$crate::__private::Value,
            ) -> $crate::plugin::Outcome {
                match $crate::__extract_json!($kind, value) {
                    ::core::option::Option::Some($inp) => $crate::plugin::Outcome::from_bool($check),
                    ::core::option::Option::None => $crate::plugin::Outcome::Valid,
                }
            }

            #[allow(unused_variables)]
            fn message(
                &self,
                value: ::core::option::Option<&$crate::__private::Value>,
                path: &str,
            ) -> $crate::__private::Cow<'static, str> {
                match $crate::__extract_json!($kind, value) {
                    ::core::option::Option::Some($minp) => $crate::__private::Cow::from($msg),
                    ::core::option::Option::None => $crate::__private::Cow::Borrowed("Invalid value"),
                }
            }
        }
    };

    // ── Struct with fields ────────────────────────────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident { $($field:ident: $fty:ty),+ $(,)? } for $kind:ident;
        check($self_:ident, $inp:ident) $check:block
        message($self2:ident, $minp:ident) $msg:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(pub $field: $fty,)+
        }

        impl $crate::plugin::Rule for $name {
            #[allow(unused_variables)]
            fn check(
                &$self_,
                value: ::core::option::Option<&$crate::__private::Value>,
                root: &$crate::__private::Value,
            ) -> $crate::plugin::Outcome {
                match $crate::__extract_json!($kind, value) {
                    ::core::option::Option::Some($inp) => $crate::plugin::Outcome::from_bool($check),
                    ::core::option::Option::None => $crate::plugin::Outcome::Valid,
                }
            }

            #[allow(unused_variables)]
            fn message(
                &$self2,
                value: ::core::option::Option<&$crate::__private::Value>,
                path: &str,
            ) -> $crate::__private::Cow<'static, str> {
                match $crate::__extract_json!($kind, value) {
                    ::core::option::Option::Some($minp) => $crate::__private::Cow::from($msg),
                    ::core::option::Option::None => $crate::__private::Cow::Borrowed("Invalid value"),
                }
            }
        }
    };
}

/// Projects an `Option<&Value>` onto the input type of a [`rule!`] kind.
#[doc(hidden)]
#[macro_export]
macro_rules! __extract_json {
    (string, $value:expr) => {
        $value.and_then($crate::__private::Value::as_str)
    };
    (number, $value:expr) => {
        $value.and_then($crate::__private::Value::as_f64)
    };
    (array, $value:expr) => {
        $value.and_then($crate::__private::Value::as_array)
    };
    (object, $value:expr) => {
        $value.and_then($crate::__private::Value::as_object)
    };
    (any, $value:expr) => {
        $value
    };
}
