//! # querygen
//!
//! Metadata-driven SQL generation for plain Rust structs.
//!
//! ## Features
//!
//! - **Declarative mapping**: table and column metadata via `#[derive(Entity)]`
//!   or an explicit [`EntityDef`] registration
//! - **Typed selectors**: WHERE/SET columns are picked with closures over the
//!   entity's generated `Props`, not strings
//! - **Dialects**: generic (SQL Server style), Postgres and SQLite pagination
//!   and upsert shapes over shared SELECT/INSERT/UPDATE/DELETE assembly
//! - **Parameter contract**: every statement comes back with the parameter
//!   names the caller must bind
//!
//! The crate only produces SQL text; executing it is up to the caller.
//!
//! ```ignore
//! use querygen::{Entity, QueryService};
//!
//! #[derive(Entity)]
//! #[orm(rename_all = "PascalCase")]
//! struct PropertyTestObject {
//!     #[orm(unique)]
//!     user_name: String,
//!     #[orm(column = "Email")]
//!     email_address: String,
//!     #[orm(flatten)]
//!     base: TestBaseObject,
//! }
//!
//! let svc = QueryService::new();
//!
//! // INSERT INTO [PropertyTestObject] ([UserName], [Email], ..) VALUES (@UserName, @EmailAddress, ..)
//! let insert = svc.insert::<PropertyTestObject>(None)?;
//!
//! // DELETE FROM [PropertyTestObject] WHERE [Email] = @EmailAddress
//! let delete = svc.delete_where::<PropertyTestObject>(
//!     |w| { w.with(|p| p.email_address)?; Ok(()) },
//!     None,
//! )?;
//! ```

pub mod binder;
pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod generator;
pub mod meta;
pub mod pagination;
pub mod registry;
pub mod service;

pub use binder::{ExprBuilder, PropBinder, PropertyBinding};
pub use case::{CaseChange, CaseConvention, LowerFirst, NoCase, SnakeCase};
pub use config::{
    DefaultConfigProvider, GeneratorSettings, QueryConfig, QueryConfigProvider,
    StaticConfigProvider,
};
pub use entity::{Entity, EntityDef, EntityRegistration, Prop};
pub use error::{OrmError, OrmResult};
pub use generator::{Dialect, PageQuery, QueryGenerator};
pub use meta::{BoundColumn, ColumnDescriptor, TableDescriptor};
pub use pagination::{PageOptions, PageRequest, PaginatedResult};
pub use registry::{ReflectedType, TypeRegistry};
pub use service::{GeneratedSql, QueryKind, QueryService, QueryServiceBuilder};

#[cfg(feature = "derive")]
pub use querygen_derive::Entity;

// Re-export inventory for use by derive macros
pub use inventory;
