//! Table and column descriptors.
//!
//! These are plain values: the registry produces them once per type and the
//! generator consumes them without further lookups.

/// A table name plus its ordered qualifiers (`schema.table`, `catalog.schema.table`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Unqualified table name.
    pub name: String,
    /// Qualifiers, outermost first.
    pub prefixes: Vec<String>,
}

impl TableDescriptor {
    /// Create a descriptor without qualifiers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefixes: Vec::new(),
        }
    }

    /// Append a qualifier (call outermost first).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Prefixes followed by the table name.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.prefixes
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
    }
}

/// Column metadata for one declared property.
///
/// `name` is the wire name before any case change; `param_name` is the name
/// callers bind values under and defaults to the property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Source property name.
    pub property: String,
    /// Column name on the wire.
    pub name: String,
    /// Parameter name used for bound values.
    pub param_name: String,
    pub is_primary_key: bool,
    pub exclude_from_insert: bool,
    pub exclude_from_update: bool,
    /// Member of the type's composite unique key (upsert conflict target).
    pub is_unique_group_member: bool,
    pub ignore: bool,
    /// Literal SQL substituted for the bound parameter (e.g. `CURRENT_TIMESTAMP`).
    pub override_value: Option<String>,
}

impl ColumnDescriptor {
    /// An ordinary column: wire and parameter names equal the property name.
    pub fn new(property: impl Into<String>) -> Self {
        let property = property.into();
        Self {
            name: property.clone(),
            param_name: property.clone(),
            property,
            is_primary_key: false,
            exclude_from_insert: false,
            exclude_from_update: false,
            is_unique_group_member: false,
            ignore: false,
            override_value: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_param(mut self, param_name: impl Into<String>) -> Self {
        self.param_name = param_name.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.override_value = Some(value.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn skip_insert(mut self) -> Self {
        self.exclude_from_insert = true;
        self
    }

    pub fn skip_update(mut self) -> Self {
        self.exclude_from_update = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique_group_member = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }
}

/// A column resolved for one statement: what the generator renders.
///
/// Rendered as `name operator value`, where a missing operator is `=` and a
/// missing value is `parameter_character + param_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundColumn {
    /// Wire name after case change.
    pub name: String,
    pub param_name: Option<String>,
    /// Literal that replaces the parameter placeholder.
    pub value: Option<String>,
    pub operator: Option<String>,
}

impl BoundColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_name: None,
            value: None,
            operator: None,
        }
    }

    pub fn param(mut self, param_name: impl Into<String>) -> Self {
        self.param_name = Some(param_name.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// The parameter this column reads from, if it is not replaced by a literal.
    pub fn bound_param(&self) -> Option<&str> {
        match self.value {
            Some(_) => None,
            None => Some(self.param_name.as_deref().unwrap_or(&self.name)),
        }
    }
}
