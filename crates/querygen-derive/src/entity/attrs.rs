//! Attribute parsing for the Entity derive macro.
//!
//! Handles struct-level and field-level `#[orm(...)]` attributes. Several
//! `#[orm]` attributes on the same item are merged.

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Ident, LitStr, Result, Token};

/// How a Rust field identifier becomes a property name.
#[derive(Clone, Copy, Default)]
pub(super) enum RenameRule {
    #[default]
    Verbatim,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
}

impl RenameRule {
    fn from_lit(lit: &LitStr) -> Result<Self> {
        match lit.value().as_str() {
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            other => Err(syn::Error::new_spanned(
                lit,
                format!(
                    "unknown rename_all rule \"{other}\", expected one of \
                     \"PascalCase\", \"camelCase\", \"snake_case\", \"SCREAMING_SNAKE_CASE\""
                ),
            )),
        }
    }

    pub(super) fn apply(self, ident: &str) -> String {
        match self {
            Self::Verbatim => ident.to_string(),
            Self::Pascal => ident.to_upper_camel_case(),
            Self::Camel => ident.to_lower_camel_case(),
            Self::Snake => ident.to_snake_case(),
            Self::ScreamingSnake => ident.to_shouty_snake_case(),
        }
    }
}

/// Struct-level attributes: `table`, `schema`, `prefix`, `rename_all`.
#[derive(Default)]
pub(super) struct StructAttr {
    pub table: Option<String>,
    /// Qualifiers, outermost first.
    pub prefixes: Vec<String>,
    pub rename_all: RenameRule,
}

impl StructAttr {
    pub(super) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
            let parsed: Self = attr.parse_args()?;
            if parsed.table.is_some() {
                out.table = parsed.table;
            }
            out.prefixes.extend(parsed.prefixes);
            if !matches!(parsed.rename_all, RenameRule::Verbatim) {
                out.rename_all = parsed.rename_all;
            }
        }
        Ok(out)
    }
}

impl Parse for StructAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut out = Self::default();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            let _: Token![=] = input.parse()?;
            let value: LitStr = input.parse()?;

            if key == "table" {
                out.table = Some(value.value());
            } else if key == "schema" {
                // `schema = "catalog.schema"` expands to one prefix per segment.
                out.prefixes
                    .extend(value.value().split('.').map(str::to_string));
            } else if key == "prefix" {
                out.prefixes.push(value.value());
            } else if key == "rename_all" {
                out.rename_all = RenameRule::from_lit(&value)?;
            } else {
                return Err(syn::Error::new_spanned(
                    &key,
                    format!("unknown orm attribute `{key}` on struct"),
                ));
            }

            if input.is_empty() {
                break;
            }
            let _: Token![,] = input.parse()?;
        }

        Ok(out)
    }
}

/// Field-level attributes.
#[derive(Default)]
pub(super) struct FieldAttr {
    pub column: Option<String>,
    pub param: Option<String>,
    pub value: Option<String>,
    pub is_id: bool,
    pub skip_insert: bool,
    pub skip_update: bool,
    pub unique: bool,
    pub ignore: bool,
    pub flatten: bool,
}

impl FieldAttr {
    pub(super) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
            let parsed: Self = attr.parse_args()?;
            out.column = parsed.column.or(out.column);
            out.param = parsed.param.or(out.param);
            out.value = parsed.value.or(out.value);
            out.is_id |= parsed.is_id;
            out.skip_insert |= parsed.skip_insert;
            out.skip_update |= parsed.skip_update;
            out.unique |= parsed.unique;
            out.ignore |= parsed.ignore;
            out.flatten |= parsed.flatten;
        }
        Ok(out)
    }

    /// `flatten` splices another entity's columns; no column flags apply to it.
    pub(super) fn has_column_flags(&self) -> bool {
        self.column.is_some()
            || self.param.is_some()
            || self.value.is_some()
            || self.is_id
            || self.skip_insert
            || self.skip_update
            || self.unique
            || self.ignore
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut out = Self::default();

        while !input.is_empty() {
            let key: Ident = input.parse()?;

            if input.peek(Token![=]) {
                let _: Token![=] = input.parse()?;
                let value: LitStr = input.parse()?;
                if key == "column" {
                    out.column = Some(value.value());
                } else if key == "param" {
                    out.param = Some(value.value());
                } else if key == "value" {
                    out.value = Some(value.value());
                } else {
                    return Err(syn::Error::new_spanned(
                        &key,
                        format!("unknown orm attribute `{key} = ...` on field"),
                    ));
                }
            } else if key == "id" || key == "primary_key" {
                out.is_id = true;
            } else if key == "skip_insert" {
                out.skip_insert = true;
            } else if key == "skip_update" {
                out.skip_update = true;
            } else if key == "unique" {
                out.unique = true;
            } else if key == "ignore" {
                out.ignore = true;
            } else if key == "flatten" {
                out.flatten = true;
            } else {
                return Err(syn::Error::new_spanned(
                    &key,
                    format!("unknown orm attribute `{key}` on field"),
                ));
            }

            if input.is_empty() {
                break;
            }
            let _: Token![,] = input.parse()?;
        }

        Ok(out)
    }
}
