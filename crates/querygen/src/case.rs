//! Column name case conventions.
//!
//! The query service runs every column wire name through a [`CaseChange`]
//! before escaping it. Table names and parameter names are left alone.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{OrmError, OrmResult};

/// Transforms a property-derived name into the name used on the wire.
pub trait CaseChange: Send + Sync {
    fn change_case(&self, input: &str) -> OrmResult<String>;
}

/// Leaves names untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCase;

impl CaseChange for NoCase {
    fn change_case(&self, input: &str) -> OrmResult<String> {
        Ok(input.to_string())
    }
}

/// `UserName` → `user_name`, `HTMLParser` → `html_parser`.
///
/// A separator goes between a lowercase letter or digit and the uppercase
/// letter after it, and between two uppercase letters when the second starts
/// a lowercase run. The result is lower-cased.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCase;

fn word_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| {
        Regex::new("([A-Z])([A-Z][a-z])|([a-z0-9])([A-Z])")
            .expect("invalid built-in word boundary regex")
    })
}

impl CaseChange for SnakeCase {
    fn change_case(&self, input: &str) -> OrmResult<String> {
        if input.is_empty() {
            return Err(OrmError::invalid_argument(
                "cannot snake_case an empty name",
            ));
        }
        Ok(word_boundary()
            .replace_all(input, "${1}${3}_${2}${4}")
            .to_lowercase())
    }
}

/// `UserName` → `userName`: lowers the first character only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerFirst;

impl CaseChange for LowerFirst {
    fn change_case(&self, input: &str) -> OrmResult<String> {
        let mut chars = input.chars();
        Ok(match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        })
    }
}

/// A case convention selectable from settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseConvention {
    #[default]
    None,
    Snake,
    LowerFirst,
}

impl CaseChange for CaseConvention {
    fn change_case(&self, input: &str) -> OrmResult<String> {
        match self {
            Self::None => NoCase.change_case(input),
            Self::Snake => SnakeCase.change_case(input),
            Self::LowerFirst => LowerFirst.change_case(input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(s: &str) -> String {
        SnakeCase.change_case(s).unwrap()
    }

    #[test]
    fn snake_splits_lower_to_upper() {
        assert_eq!(snake("UserName"), "user_name");
        assert_eq!(snake("EmailAddress"), "email_address");
        assert_eq!(snake("Id"), "id");
        assert_eq!(snake("A"), "a");
    }

    #[test]
    fn snake_splits_acronym_before_word() {
        assert_eq!(snake("HTMLParser"), "html_parser");
        assert_eq!(snake("UserID"), "user_id");
        assert_eq!(snake("ABC"), "abc");
    }

    #[test]
    fn snake_boundaries_do_not_overlap() {
        // `aB` consumes the `B`, so `BCd` is never seen as an acronym boundary.
        assert_eq!(snake("aBCd"), "a_bcd");
        assert_eq!(snake("iPHone"), "i_phone");
    }

    #[test]
    fn snake_splits_after_digits() {
        assert_eq!(snake("Address2Line"), "address2_line");
        assert_eq!(snake("Utf8Name"), "utf8_name");
    }

    #[test]
    fn snake_is_idempotent() {
        for input in ["UserName", "HTMLParser", "CreatedAt", "Address2Line"] {
            let once = snake(input);
            assert_eq!(snake(&once), once);
        }
    }

    #[test]
    fn snake_rejects_empty() {
        let err = SnakeCase.change_case("").unwrap_err();
        assert!(matches!(err, OrmError::InvalidArgument(_)));
    }

    #[test]
    fn identity_and_lower_first_accept_empty() {
        assert_eq!(NoCase.change_case("").unwrap(), "");
        assert_eq!(LowerFirst.change_case("").unwrap(), "");
    }

    #[test]
    fn lower_first_only_touches_first_char() {
        assert_eq!(LowerFirst.change_case("UserName").unwrap(), "userName");
        assert_eq!(LowerFirst.change_case("ID").unwrap(), "iD");
        assert_eq!(LowerFirst.change_case("id").unwrap(), "id");
    }

    #[test]
    fn convention_dispatches() {
        assert_eq!(CaseConvention::None.change_case("UserName").unwrap(), "UserName");
        assert_eq!(CaseConvention::Snake.change_case("UserName").unwrap(), "user_name");
        assert_eq!(
            CaseConvention::LowerFirst.change_case("UserName").unwrap(),
            "userName"
        );
    }
}
