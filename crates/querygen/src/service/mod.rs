//! Query service: the high-level facade.
//!
//! Every operation resolves `T` through the [`TypeRegistry`], turns the
//! resolved columns into [`BoundColumn`]s (applying the case change to wire
//! names), and hands them to the dialect's [`QueryGenerator`].
//!
//! ```ignore
//! use querygen::{QueryService, Dialect};
//!
//! let svc = QueryService::builder().dialect(Dialect::Postgres).build();
//!
//! let fetch = svc.fetch::<User>(None)?;
//! let update = svc.update_only_where::<User>(
//!     |s| { s.prop(|p| p.email)?; Ok(()) },
//!     |w| { w.with(|p| p.user_name)?; Ok(()) },
//!     None,
//! )?;
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::binder::{ExprBuilder, PropBinder, PropertyBinding};
use crate::case::{CaseChange, NoCase};
use crate::config::{
    DefaultConfigProvider, GeneratorSettings, QueryConfig, QueryConfigProvider, StaticConfigProvider,
};
use crate::entity::{Entity, Prop};
use crate::error::{OrmError, OrmResult};
use crate::generator::{Dialect, PageQuery, QueryGenerator};
use crate::meta::{BoundColumn, ColumnDescriptor, TableDescriptor};
use crate::pagination::PageOptions;
use crate::registry::{ReflectedType, TypeRegistry};

/// Kind of statement a facade call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Fetch,
    Insert,
    Update,
    UpdateOnly,
    Delete,
    Paginate,
    Upsert,
}

/// SQL text plus the parameter names the caller must bind.
///
/// `params` is in first-appearance order without duplicates. Columns whose
/// value is replaced by a literal contribute no parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql {
    pub sql: String,
    pub params: Vec<String>,
}

impl GeneratedSql {
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }
}

impl std::fmt::Display for GeneratedSql {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}

impl AsRef<str> for GeneratedSql {
    fn as_ref(&self) -> &str {
        &self.sql
    }
}

impl PartialEq<&str> for GeneratedSql {
    fn eq(&self, other: &&str) -> bool {
        self.sql == *other
    }
}

/// Generates SQL for [`Entity`] types.
///
/// Cheap to clone; clones share the registry, case change and config provider.
#[derive(Clone)]
pub struct QueryService {
    registry: Arc<TypeRegistry>,
    case: Arc<dyn CaseChange>,
    generator: QueryGenerator,
    config: Arc<dyn QueryConfigProvider>,
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("dialect", &self.generator.dialect())
            .field("registered_types", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl Default for QueryService {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl QueryService {
    /// Generic dialect, identity case change, fresh registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> QueryServiceBuilder {
        QueryServiceBuilder::default()
    }

    /// Build a service from loaded settings, sharing `registry`.
    pub fn from_settings(settings: &GeneratorSettings, registry: Arc<TypeRegistry>) -> Self {
        Self::builder()
            .registry(registry)
            .dialect(settings.dialect)
            .case_change(settings.case)
            .query_config(settings.query_config())
            .build()
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn dialect(&self) -> Dialect {
        self.generator.dialect()
    }

    pub fn generator(&self) -> &QueryGenerator {
        &self.generator
    }

    /// Reflected metadata for `T`.
    pub fn ty<T: Entity>(&self) -> Arc<ReflectedType> {
        self.registry.resolve::<T>()
    }

    /// `SELECT * FROM t`.
    pub fn select<T: Entity>(&self, config: Option<&QueryConfig>) -> OrmResult<GeneratedSql> {
        self.select_where::<T>(|_| Ok(()), config)
    }

    /// `SELECT * FROM t WHERE ..` with predicates from `filter`.
    pub fn select_where<T: Entity>(
        &self,
        filter: impl FnOnce(&mut ExprBuilder<'_, T>) -> OrmResult<()>,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let filter = self.where_columns::<T>(&reflected, filter)?;
        let sql = self.generator.build_select(&table, &config, &filter);
        Ok(self.finish(QueryKind::Select, &table, sql, &[filter.as_slice()], &[]))
    }

    /// Select one row by primary key.
    pub fn fetch<T: Entity>(&self, config: Option<&QueryConfig>) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let filter = self.primary_key_columns(&reflected)?;
        let sql = self.generator.build_select(&table, &config, &filter);
        Ok(self.finish(QueryKind::Fetch, &table, sql, &[filter.as_slice()], &[]))
    }

    /// Insert every column not excluded from inserts.
    pub fn insert<T: Entity>(&self, config: Option<&QueryConfig>) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let columns = self.columns(reflected.insertable(), true)?;
        let sql = self.generator.build_insert(&table, &config, &columns)?;
        Ok(self.finish(QueryKind::Insert, &table, sql, &[columns.as_slice()], &[]))
    }

    /// Update every column not excluded from updates, keyed by primary key.
    pub fn update<T: Entity>(&self, config: Option<&QueryConfig>) -> OrmResult<GeneratedSql> {
        self.update_where::<T>(|_| Ok(()), config)
    }

    /// Update every column not excluded from updates.
    ///
    /// Falls back to the primary key when `filter` binds nothing.
    pub fn update_where<T: Entity>(
        &self,
        filter: impl FnOnce(&mut ExprBuilder<'_, T>) -> OrmResult<()>,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let filter = self.where_or_primary_key::<T>(&reflected, filter)?;
        let columns = self.columns(reflected.updatable(), true)?;
        let clause = self.generator.build_where(&config, " AND ", &filter);
        let sql = self
            .generator
            .build_update(&table, &config, Some(&clause), &columns)?;
        let groups = [columns.as_slice(), filter.as_slice()];
        Ok(self.finish(QueryKind::Update, &table, sql, &groups, &[]))
    }

    /// Update only the columns named by `set`, keyed by primary key.
    pub fn update_only<T: Entity>(
        &self,
        set: impl FnOnce(&mut PropBinder<'_, T>) -> OrmResult<()>,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        self.update_only_where::<T>(set, |_| Ok(()), config)
    }

    /// Update only the columns named by `set`.
    ///
    /// Falls back to the primary key when `filter` binds nothing.
    pub fn update_only_where<T: Entity>(
        &self,
        set: impl FnOnce(&mut PropBinder<'_, T>) -> OrmResult<()>,
        filter: impl FnOnce(&mut ExprBuilder<'_, T>) -> OrmResult<()>,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let filter = self.where_or_primary_key::<T>(&reflected, filter)?;
        let clause = self.generator.build_where(&config, " AND ", &filter);

        let mut binder = PropBinder::<T>::new(&reflected);
        set(&mut binder)?;
        if binder.is_empty() {
            return Err(OrmError::EmptySetList(reflected.name().to_string()));
        }
        let columns = self.bound(binder.bindings(), true)?;

        let sql = self
            .generator
            .build_update(&table, &config, Some(&clause), &columns)?;
        let groups = [columns.as_slice(), filter.as_slice()];
        Ok(self.finish(QueryKind::UpdateOnly, &table, sql, &groups, &[]))
    }

    /// Delete one row by primary key.
    pub fn delete<T: Entity>(&self, config: Option<&QueryConfig>) -> OrmResult<GeneratedSql> {
        self.delete_where::<T>(|_| Ok(()), config)
    }

    /// Delete with predicates from `filter`, falling back to the primary key.
    pub fn delete_where<T: Entity>(
        &self,
        filter: impl FnOnce(&mut ExprBuilder<'_, T>) -> OrmResult<()>,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let filter = self.where_or_primary_key::<T>(&reflected, filter)?;
        let sql = self.generator.build_delete(&table, &config, &filter);
        Ok(self.finish(QueryKind::Delete, &table, sql, &[filter.as_slice()], &[]))
    }

    /// Page query plus count query, sorted by `sort_by`.
    pub fn paginate<T: Entity>(
        &self,
        sort_by: impl FnOnce(&T::Props<T>) -> Prop<T>,
        options: &PageOptions,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        self.paginate_where::<T>(sort_by, |_| Ok(()), options, config)
    }

    /// Page query plus count query over rows matching `filter`.
    pub fn paginate_where<T: Entity>(
        &self,
        sort_by: impl FnOnce(&T::Props<T>) -> Prop<T>,
        filter: impl FnOnce(&mut ExprBuilder<'_, T>) -> OrmResult<()>,
        options: &PageOptions,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let filter = self.where_columns::<T>(&reflected, filter)?;

        let mut sort = PropBinder::<T>::new(&reflected);
        sort.prop(sort_by)?;
        let sort_column = self.bound(sort.bindings(), false)?;
        let sort_name = sort_column
            .first()
            .map(|c| c.name.as_str())
            .unwrap_or_default();

        let page = PageQuery {
            sort_column: sort_name,
            ascending: options.ascending,
            limit_param: &options.limit_param,
            offset_param: &options.offset_param,
        };
        let sql = self.generator.build_paginate(&table, &config, &filter, &page);

        let extra = match self.dialect() {
            Dialect::Generic => [options.offset_param.as_str(), options.limit_param.as_str()],
            Dialect::Postgres | Dialect::Sqlite => {
                [options.limit_param.as_str(), options.offset_param.as_str()]
            }
        };
        Ok(self.finish(QueryKind::Paginate, &table, sql, &[filter.as_slice()], &extra))
    }

    /// Upsert keyed on the type's unique columns.
    pub fn upsert<T: Entity>(&self, config: Option<&QueryConfig>) -> OrmResult<GeneratedSql> {
        self.upsert_on::<T>(|_| Ok(()), config)
    }

    /// Upsert keyed on the columns named by `conflicts`.
    ///
    /// Falls back to the type's unique columns when `conflicts` names none.
    pub fn upsert_on<T: Entity>(
        &self,
        conflicts: impl FnOnce(&mut PropBinder<'_, T>) -> OrmResult<()>,
        config: Option<&QueryConfig>,
    ) -> OrmResult<GeneratedSql> {
        let config = self.config_or_default(config);
        let reflected = self.ty::<T>();
        let table = reflected.table();

        let updates = self.columns(reflected.updatable(), true)?;
        let inserts = self.columns(reflected.insertable(), true)?;

        let mut binder = PropBinder::<T>::new(&reflected);
        conflicts(&mut binder)?;
        let conflicts = if binder.is_empty() {
            let unique = self.columns(reflected.unique_keys(), false)?;
            if unique.is_empty() {
                return Err(OrmError::NoUniqueKeyFound(reflected.name().to_string()));
            }
            unique
        } else {
            self.bound(binder.bindings(), false)?
        };

        let sql = self
            .generator
            .build_upsert(&table, &config, &conflicts, &inserts, &updates)?;
        let order = match self.dialect() {
            Dialect::Generic => [updates.as_slice(), conflicts.as_slice(), inserts.as_slice()],
            Dialect::Postgres | Dialect::Sqlite => [inserts.as_slice(), updates.as_slice(), &[][..]],
        };
        Ok(self.finish(QueryKind::Upsert, &table, sql, &order, &[]))
    }

    fn config_or_default<'c>(&self, config: Option<&'c QueryConfig>) -> Cow<'c, QueryConfig> {
        match config {
            Some(config) => Cow::Borrowed(config),
            None => Cow::Owned(self.config.query_config(self.generator.dialect())),
        }
    }

    fn bind(
        &self,
        column: &ColumnDescriptor,
        value: Option<&str>,
        operator: Option<&str>,
        use_override: bool,
    ) -> OrmResult<BoundColumn> {
        let value = value.or_else(|| {
            use_override
                .then_some(column.override_value.as_deref())
                .flatten()
        });

        Ok(BoundColumn {
            name: self.case.change_case(&column.name)?,
            param_name: Some(column.param_name.clone()),
            value: value.map(str::to_string),
            operator: operator.map(str::to_string),
        })
    }

    fn bound(
        &self,
        bindings: &[PropertyBinding<'_>],
        use_override: bool,
    ) -> OrmResult<Vec<BoundColumn>> {
        bindings
            .iter()
            .map(|b| {
                self.bind(
                    b.column,
                    b.value.as_deref(),
                    b.operator.as_deref(),
                    use_override,
                )
            })
            .collect()
    }

    fn columns<'c>(
        &self,
        columns: impl Iterator<Item = &'c ColumnDescriptor>,
        use_override: bool,
    ) -> OrmResult<Vec<BoundColumn>> {
        columns
            .map(|c| self.bind(c, None, None, use_override))
            .collect()
    }

    fn where_columns<T: Entity>(
        &self,
        reflected: &ReflectedType,
        filter: impl FnOnce(&mut ExprBuilder<'_, T>) -> OrmResult<()>,
    ) -> OrmResult<Vec<BoundColumn>> {
        let mut builder = ExprBuilder::<T>::new(reflected);
        filter(&mut builder)?;
        self.bound(builder.bindings(), false)
    }

    fn primary_key_columns(&self, reflected: &ReflectedType) -> OrmResult<Vec<BoundColumn>> {
        let keys = self.columns(reflected.primary_keys(), false)?;
        if keys.is_empty() {
            return Err(OrmError::NoPrimaryKeyFound(reflected.name().to_string()));
        }
        Ok(keys)
    }

    fn where_or_primary_key<T: Entity>(
        &self,
        reflected: &ReflectedType,
        filter: impl FnOnce(&mut ExprBuilder<'_, T>) -> OrmResult<()>,
    ) -> OrmResult<Vec<BoundColumn>> {
        let explicit = self.where_columns::<T>(reflected, filter)?;
        if explicit.is_empty() {
            self.primary_key_columns(reflected)
        } else {
            Ok(explicit)
        }
    }

    fn finish(
        &self,
        kind: QueryKind,
        table: &TableDescriptor,
        sql: String,
        groups: &[&[BoundColumn]],
        extra: &[&str],
    ) -> GeneratedSql {
        let mut params: Vec<String> = Vec::new();
        let names = groups
            .iter()
            .flat_map(|group| group.iter())
            .filter_map(BoundColumn::bound_param)
            .chain(extra.iter().copied());
        for name in names {
            if !params.iter().any(|p| p == name) {
                params.push(name.to_string());
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "querygen.sql",
            kind = ?kind,
            table = %table.name,
            sql = %sql,
            param_count = params.len(),
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (kind, table);

        GeneratedSql { sql, params }
    }
}

/// Wires a [`QueryService`] from explicit parts.
#[derive(Default)]
pub struct QueryServiceBuilder {
    registry: Option<Arc<TypeRegistry>>,
    case: Option<Arc<dyn CaseChange>>,
    dialect: Dialect,
    config: Option<Arc<dyn QueryConfigProvider>>,
}

impl QueryServiceBuilder {
    /// Share an existing registry (default: a fresh one).
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Case change applied to column wire names (default: identity).
    pub fn case_change(mut self, case: impl CaseChange + 'static) -> Self {
        self.case = Some(Arc::new(case));
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Config used when a call passes none (default: the dialect's config).
    pub fn config_provider(mut self, provider: impl QueryConfigProvider + 'static) -> Self {
        self.config = Some(Arc::new(provider));
        self
    }

    /// Shorthand for a [`StaticConfigProvider`].
    pub fn query_config(self, config: QueryConfig) -> Self {
        self.config_provider(StaticConfigProvider(config))
    }

    pub fn build(self) -> QueryService {
        QueryService {
            registry: self.registry.unwrap_or_default(),
            case: self.case.unwrap_or_else(|| Arc::new(NoCase)),
            generator: QueryGenerator::new(self.dialect),
            config: self
                .config
                .unwrap_or_else(|| Arc::new(DefaultConfigProvider)),
        }
    }
}
