//! Dialect query generator: raw SQL assembly from resolved descriptors.
//!
//! Nothing here reflects or caches. Every function takes already-resolved
//! [`TableDescriptor`]/[`BoundColumn`] values and returns SQL text. Only
//! [`QueryGenerator::build_paginate`] and [`QueryGenerator::build_upsert`]
//! depend on the [`Dialect`].

use serde::Deserialize;

use crate::config::QueryConfig;
use crate::error::{OrmError, OrmResult};
use crate::meta::{BoundColumn, TableDescriptor};

/// SQL dialect family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// SQL Server style: `OFFSET .. FETCH NEXT` pagination, `IF (@@ROWCOUNT = 0)` upsert.
    #[default]
    Generic,
    /// `LIMIT .. OFFSET` pagination, `ON CONFLICT .. DO UPDATE` upsert.
    Postgres,
    /// Same statement shapes as Postgres.
    Sqlite,
}

impl Dialect {
    pub fn default_config(self) -> QueryConfig {
        match self {
            Self::Generic => QueryConfig::generic(),
            Self::Postgres => QueryConfig::postgres(),
            Self::Sqlite => QueryConfig::sqlite(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort and parameter naming for a paginated select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery<'a> {
    /// Unescaped sort column wire name.
    pub sort_column: &'a str,
    pub ascending: bool,
    pub limit_param: &'a str,
    pub offset_param: &'a str,
}

/// Stateless SQL string assembly for one dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryGenerator {
    dialect: Dialect,
}

impl QueryGenerator {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Wrap `text` in the configured escape strings.
    ///
    /// Empty text, or a config with escaping off, is returned unchanged.
    pub fn escape_identifier(&self, text: &str, config: &QueryConfig) -> String {
        if text.is_empty() || !config.escape {
            return text.to_string();
        }
        let mut out =
            String::with_capacity(config.escape_start.len() + text.len() + config.escape_end.len());
        out.push_str(&config.escape_start);
        out.push_str(text);
        out.push_str(&config.escape_end);
        out
    }

    /// Escape each qualifier and the table name, joined with `.`.
    pub fn escape_table(&self, table: &TableDescriptor, config: &QueryConfig) -> String {
        table
            .parts()
            .map(|part| self.escape_identifier(part, config))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `name operator value` per column, joined by `join`.
    ///
    /// The operator defaults to `=`; the value defaults to the parameter
    /// character followed by the column's parameter name (or its name).
    pub fn build_where(&self, config: &QueryConfig, join: &str, columns: &[BoundColumn]) -> String {
        columns
            .iter()
            .map(|column| {
                format!(
                    "{} {} {}",
                    self.escape_identifier(&column.name, config),
                    column.operator.as_deref().unwrap_or("="),
                    self.bound_value(column, config)
                )
            })
            .collect::<Vec<_>>()
            .join(join)
    }

    /// `INSERT INTO t (cols) VALUES (values)`.
    pub fn build_insert(
        &self,
        table: &TableDescriptor,
        config: &QueryConfig,
        columns: &[BoundColumn],
    ) -> OrmResult<String> {
        if columns.is_empty() {
            return Err(OrmError::empty_columns(&table.name, "insert"));
        }

        let names = columns
            .iter()
            .map(|c| self.escape_identifier(&c.name, config))
            .collect::<Vec<_>>()
            .join(", ");
        let values = columns
            .iter()
            .map(|c| self.bound_value(c, config))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "INSERT INTO {} ({names}) VALUES ({values})",
            self.escape_table(table, config)
        ))
    }

    /// `UPDATE t SET a = @a, .. [WHERE where_clause]`.
    pub fn build_update(
        &self,
        table: &TableDescriptor,
        config: &QueryConfig,
        where_clause: Option<&str>,
        columns: &[BoundColumn],
    ) -> OrmResult<String> {
        if columns.is_empty() {
            return Err(OrmError::empty_columns(&table.name, "update"));
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            self.escape_table(table, config),
            self.build_where(config, ", ", columns)
        );
        if let Some(clause) = where_clause.filter(|c| !c.is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        Ok(sql)
    }

    /// `SELECT * FROM t [WHERE ..]`, predicates joined with `AND`.
    pub fn build_select(
        &self,
        table: &TableDescriptor,
        config: &QueryConfig,
        where_columns: &[BoundColumn],
    ) -> String {
        format!(
            "SELECT * FROM {}{}",
            self.escape_table(table, config),
            self.where_suffix(config, where_columns)
        )
    }

    /// `DELETE FROM t [WHERE ..]`, predicates joined with `AND`.
    pub fn build_delete(
        &self,
        table: &TableDescriptor,
        config: &QueryConfig,
        where_columns: &[BoundColumn],
    ) -> String {
        format!(
            "DELETE FROM {}{}",
            self.escape_table(table, config),
            self.where_suffix(config, where_columns)
        )
    }

    /// A page query followed by a total count query, both ending in `;`.
    pub fn build_paginate(
        &self,
        table: &TableDescriptor,
        config: &QueryConfig,
        where_columns: &[BoundColumn],
        page: &PageQuery<'_>,
    ) -> String {
        let table = self.escape_table(table, config);
        let filter = self.where_suffix(config, where_columns);
        let sort = self.escape_identifier(page.sort_column, config);
        let direction = if page.ascending { "ASC" } else { "DESC" };
        let limit = format!("{}{}", config.parameter_character, page.limit_param);
        let offset = format!("{}{}", config.parameter_character, page.offset_param);

        match self.dialect {
            Dialect::Generic => format!(
                "SELECT * FROM {table}{filter} ORDER BY {sort} {direction} \
                 OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY; \
                 SELECT COUNT(*) FROM {table}{filter};"
            ),
            Dialect::Postgres | Dialect::Sqlite => format!(
                "SELECT * FROM {table}{filter} ORDER BY {sort} {direction} \
                 LIMIT {limit} OFFSET {offset}; \
                 SELECT COUNT(*) FROM {table}{filter};"
            ),
        }
    }

    /// Update-or-insert keyed on `conflicts`.
    ///
    /// Generic: `UPDATE .. WHERE <conflicts>; IF (@@ROWCOUNT = 0) INSERT ..;`.
    /// Postgres/Sqlite: `INSERT .. ON CONFLICT (<conflicts>) DO UPDATE SET ..`.
    /// Conflict column names are escaped like every other identifier.
    pub fn build_upsert(
        &self,
        table: &TableDescriptor,
        config: &QueryConfig,
        conflicts: &[BoundColumn],
        inserts: &[BoundColumn],
        updates: &[BoundColumn],
    ) -> OrmResult<String> {
        if conflicts.is_empty() {
            return Err(OrmError::empty_columns(&table.name, "conflict on"));
        }

        let insert = self.build_insert(table, config, inserts)?;
        match self.dialect {
            Dialect::Generic => {
                let filter = self.build_where(config, " AND ", conflicts);
                let update = self.build_update(table, config, Some(&filter), updates)?;
                Ok(format!("{update}; IF (@@ROWCOUNT = 0) {insert};"))
            }
            Dialect::Postgres | Dialect::Sqlite => {
                if updates.is_empty() {
                    return Err(OrmError::empty_columns(&table.name, "update"));
                }
                let targets = conflicts
                    .iter()
                    .map(|c| self.escape_identifier(&c.name, config))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(format!(
                    "{insert} ON CONFLICT ({targets}) DO UPDATE SET {}",
                    self.build_where(config, ", ", updates)
                ))
            }
        }
    }

    fn bound_value(&self, column: &BoundColumn, config: &QueryConfig) -> String {
        match &column.value {
            Some(value) => value.clone(),
            None => format!(
                "{}{}",
                config.parameter_character,
                column.param_name.as_deref().unwrap_or(&column.name)
            ),
        }
    }

    fn where_suffix(&self, config: &QueryConfig, columns: &[BoundColumn]) -> String {
        if columns.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.build_where(config, " AND ", columns))
        }
    }
}
