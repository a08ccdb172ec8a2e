//! The metadata input contract.
//!
//! A type takes part in SQL generation by implementing [`Entity`], usually via
//! `#[derive(Entity)]`:
//!
//! ```ignore
//! use querygen::Entity;
//!
//! #[derive(Entity)]
//! #[orm(table = "users", schema = "app")]
//! struct User {
//!     #[orm(id, skip_insert, skip_update)]
//!     id: i64,
//!     #[orm(unique)]
//!     user_name: String,
//!     #[orm(column = "email")]
//!     email_address: String,
//!     #[orm(ignore)]
//!     session: Option<String>,
//! }
//! ```
//!
//! Types that cannot use the derive describe themselves with [`EntityDef`].

use std::marker::PhantomData;

use crate::meta::ColumnDescriptor;

/// A typed reference to one declared property of `E`.
///
/// Values come from [`Entity::props`]; selectors passed to the binder return one.
pub struct Prop<E> {
    name: &'static str,
    _owner: PhantomData<fn() -> E>,
}

impl<E> Prop<E> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _owner: PhantomData,
        }
    }

    /// The property name this reference resolves against.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E> Clone for Prop<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Prop<E> {}

impl<E> std::fmt::Debug for Prop<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Prop").field(&self.name).finish()
    }
}

/// A data type that maps onto a table.
pub trait Entity: 'static {
    /// Typed property references, owned by entity `E` (`E = Self` except when flattened).
    type Props<E: 'static>;

    fn props<E: 'static>() -> Self::Props<E>;

    /// Declared members in declaration order, ignored ones included.
    fn entity_def() -> EntityDef;
}

/// The unresolved description of a type: what attributes or a registration call declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    /// Fully qualified type name; the registry key.
    pub type_name: &'static str,
    /// Short type name; the fallback table name.
    pub short_name: String,
    pub table_name: Option<String>,
    /// Table qualifiers, outermost first.
    pub prefixes: Vec<String>,
    pub columns: Vec<ColumnDescriptor>,
}

impl EntityDef {
    /// Start a description for `T` with no table metadata and no columns.
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_name = std::any::type_name::<T>();
        Self {
            type_name,
            short_name: short_type_name(type_name).to_string(),
            table_name: None,
            prefixes: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Splice another entity's columns at the current position.
    ///
    /// Table metadata of the flattened entity is not carried over.
    pub fn flatten<T: Entity>(mut self) -> Self {
        self.columns.extend(T::entity_def().columns);
        self
    }
}

/// Strip the module path and generic arguments: `app::models::Page<app::User>` → `Page`.
pub(crate) fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Registration entry for start-up reflection.
///
/// `#[derive(Entity)]` submits one per type; see
/// [`TypeRegistry::with_registered`](crate::TypeRegistry::with_registered).
pub struct EntityRegistration {
    pub entity_def: fn() -> EntityDef,
}

inventory::collect!(EntityRegistration);

#[cfg(test)]
mod tests {
    use super::*;

    mod nested {
        pub struct Page<T>(pub T);
    }

    #[test]
    fn short_name_strips_path_and_generics() {
        assert_eq!(short_type_name("app::models::User"), "User");
        assert_eq!(
            short_type_name(std::any::type_name::<nested::Page<String>>()),
            "Page"
        );
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn entity_def_builder_keeps_order() {
        let def = EntityDef::of::<nested::Page<u8>>()
            .table("pages")
            .prefix("app")
            .column(ColumnDescriptor::new("Id").primary_key())
            .column(ColumnDescriptor::new("Title"));

        assert!(def.type_name.ends_with("Page<u8>"));
        assert_eq!(def.short_name, "Page");
        assert_eq!(def.table_name.as_deref(), Some("pages"));
        assert_eq!(def.prefixes, ["app"]);
        let props: Vec<_> = def.columns.iter().map(|c| c.property.as_str()).collect();
        assert_eq!(props, ["Id", "Title"]);
    }

    #[test]
    fn prop_is_copy_and_named() {
        let p: Prop<String> = Prop::new("Title");
        let q = p;
        assert_eq!(p.name(), q.name());
        assert_eq!(format!("{p:?}"), "Prop(\"Title\")");
    }
}
