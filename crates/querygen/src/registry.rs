//! Reflected type metadata and the registry that caches it.
//!
//! [`TypeRegistry`] resolves an [`Entity`] into a [`ReflectedType`] once and
//! hands out shared, immutable copies afterwards. Entries are only ever
//! appended.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

use crate::entity::{Entity, EntityDef, EntityRegistration};
use crate::meta::{ColumnDescriptor, TableDescriptor};

/// Resolved table/column mapping for one type.
///
/// Ignored members are dropped; the remaining columns keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedType {
    type_name: &'static str,
    short_name: String,
    table_name: Option<String>,
    prefixes: Vec<String>,
    properties: IndexMap<String, ColumnDescriptor>,
}

impl ReflectedType {
    /// Resolve a declared type description.
    ///
    /// When two members share a property name (e.g. through `flatten`), the
    /// first declaration is kept.
    pub fn reflect(def: EntityDef) -> Self {
        let mut properties = IndexMap::with_capacity(def.columns.len());
        for column in def.columns.into_iter().filter(|c| !c.ignore) {
            properties.entry(column.property.clone()).or_insert(column);
        }

        Self {
            type_name: def.type_name,
            short_name: def.short_name,
            table_name: def.table_name,
            prefixes: def.prefixes,
            properties,
        }
    }

    /// Fully qualified type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Short type name, used in error messages.
    pub fn name(&self) -> &str {
        &self.short_name
    }

    /// The table this type maps to; falls back to the short type name.
    pub fn table(&self) -> TableDescriptor {
        TableDescriptor {
            name: self
                .table_name
                .clone()
                .unwrap_or_else(|| self.short_name.clone()),
            prefixes: self.prefixes.clone(),
        }
    }

    /// Look up a non-ignored column by property name.
    pub fn property(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.properties.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.properties.values()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns().filter(|c| c.is_primary_key)
    }

    pub fn unique_keys(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns().filter(|c| c.is_unique_group_member)
    }

    pub fn insertable(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns().filter(|c| !c.exclude_from_insert)
    }

    pub fn updatable(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns().filter(|c| !c.exclude_from_update)
    }
}

/// Process-wide cache of [`ReflectedType`]s, keyed by fully qualified type name.
///
/// Construct one at start-up and share it (`Arc<TypeRegistry>`). Two threads
/// resolving the same type for the first time may both reflect it; the first
/// stored entry wins and both results are identical.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<&'static str, Arc<ReflectedType>>>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with every `#[derive(Entity)]` type in the binary.
    pub fn with_registered() -> Self {
        let registry = Self::new();
        for registration in inventory::iter::<EntityRegistration> {
            registry.resolve_def((registration.entity_def)());
        }
        registry
    }

    /// Get the reflected metadata for `T`, reflecting it on first use.
    ///
    /// The entry is keyed on `T` even when its `entity_def` describes
    /// another type name.
    pub fn resolve<T: Entity>(&self) -> Arc<ReflectedType> {
        let key = std::any::type_name::<T>();
        if let Some(found) = self.lookup(key) {
            return found;
        }
        self.store(key, T::entity_def())
    }

    /// Reflect and cache a type description (no-op if its type is already cached).
    pub fn resolve_def(&self, def: EntityDef) -> Arc<ReflectedType> {
        if let Some(found) = self.lookup(def.type_name) {
            return found;
        }
        self.store(def.type_name, def)
    }

    /// Get the cached metadata for `T` without reflecting it.
    pub fn get<T: Entity>(&self) -> Option<Arc<ReflectedType>> {
        self.lookup(std::any::type_name::<T>())
    }

    /// Check whether `T` has been reflected.
    pub fn contains<T: Entity>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Get the number of cached types.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn store(&self, key: &'static str, def: EntityDef) -> Arc<ReflectedType> {
        let reflected = Arc::new(ReflectedType::reflect(def));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "querygen.registry",
            key,
            type_name = reflected.type_name(),
            table = %reflected.table().name,
            columns = reflected.len(),
            "reflected type"
        );

        let mut types = self.types.write().unwrap_or_else(PoisonError::into_inner);
        types.entry(key).or_insert(reflected).clone()
    }

    fn lookup(&self, key: &str) -> Option<Arc<ReflectedType>> {
        self.read().get(key).cloned()
    }

    // Entries are immutable once inserted, so a poisoned lock still guards valid data.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<&'static str, Arc<ReflectedType>>> {
        self.types.read().unwrap_or_else(PoisonError::into_inner)
    }
}
