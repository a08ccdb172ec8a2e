//! Derive macros for querygen
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod entity;

/// Derive the `Entity` metadata contract for a struct.
///
/// # Example
///
/// ```ignore
/// use querygen::Entity;
///
/// #[derive(Entity)]
/// #[orm(table = "users", schema = "app", rename_all = "PascalCase")]
/// struct User {
///     #[orm(id, skip_insert, skip_update)]
///     id: i64,
///     #[orm(unique)]
///     user_name: String,
///     #[orm(column = "Email")]
///     email_address: String,
///     #[orm(skip_insert, value = "CURRENT_TIMESTAMP")]
///     updated_at: String,
///     #[orm(ignore)]
///     session: Option<String>,
/// }
/// ```
///
/// # Generated
///
/// - `UserProps<E>` - one `Prop<E>` per field, for typed selectors (`|p| p.user_name`)
/// - `impl Entity for User`
/// - an `EntityRegistration` for `TypeRegistry::with_registered()`
///
/// # Attributes
///
/// Struct level:
/// - `#[orm(table = "name")]` - Table name (default: the struct name)
/// - `#[orm(schema = "a.b")]` / `#[orm(prefix = "a")]` - Table qualifiers, outermost first
/// - `#[orm(rename_all = "PascalCase")]` - Property naming rule for field identifiers
///   (`PascalCase`, `camelCase`, `snake_case`, `SCREAMING_SNAKE_CASE`)
///
/// Field level:
/// - `#[orm(column = "name")]` - Wire name (default: the property name)
/// - `#[orm(param = "name")]` - Parameter name (default: the property name)
/// - `#[orm(id)]` / `#[orm(primary_key)]` - Primary key member
/// - `#[orm(skip_insert)]`, `#[orm(skip_update)]` - Leave out of INSERT / UPDATE column lists
/// - `#[orm(unique)]` - Member of the upsert conflict key
/// - `#[orm(value = "SQL")]` - Literal rendered instead of the parameter in INSERT/SET lists
/// - `#[orm(ignore)]` - Not a column
/// - `#[orm(flatten)]` - Splice the columns of another `Entity` here
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
