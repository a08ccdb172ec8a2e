//! Expression binder: typed property selectors resolved to column bindings.
//!
//! Selectors are closures over the entity's generated `Props` struct, so a
//! misspelled property is a compile error. Members that exist but are ignored
//! still fail here with [`OrmError::InvalidProperty`], at bind time.
//!
//! ```ignore
//! svc.select_where::<User>(|w| {
//!     w.with(|p| p.first_name)?.is_null(|p| p.deleted_at)?;
//!     Ok(())
//! })?;
//! ```

use crate::entity::{Entity, Prop};
use crate::error::{OrmError, OrmResult};
use crate::meta::ColumnDescriptor;
use crate::registry::ReflectedType;

/// A column referenced by one binder call, with optional overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBinding<'a> {
    pub column: &'a ColumnDescriptor,
    /// Literal rendered instead of the parameter placeholder.
    pub value: Option<String>,
    /// Comparison operator; `=` when absent.
    pub operator: Option<String>,
}

struct Bindings<'a, T: Entity> {
    reflected: &'a ReflectedType,
    props: T::Props<T>,
    bound: Vec<PropertyBinding<'a>>,
}

impl<'a, T: Entity> Bindings<'a, T> {
    fn new(reflected: &'a ReflectedType) -> Self {
        Self {
            reflected,
            props: T::props::<T>(),
            bound: Vec::new(),
        }
    }

    fn bind(
        &mut self,
        selector: impl FnOnce(&T::Props<T>) -> Prop<T>,
        value: Option<&str>,
        operator: Option<&str>,
    ) -> OrmResult<()> {
        let prop = selector(&self.props);
        let column = self
            .reflected
            .property(prop.name())
            .ok_or_else(|| OrmError::invalid_property(self.reflected.name(), prop.name()))?;

        self.bound.push(PropertyBinding {
            column,
            value: value.map(str::to_string),
            operator: operator.map(str::to_string),
        });
        Ok(())
    }
}

/// Builds WHERE predicates for `T`. Each call appends one binding, in call order.
pub struct ExprBuilder<'a, T: Entity> {
    inner: Bindings<'a, T>,
}

impl<'a, T: Entity> ExprBuilder<'a, T> {
    pub fn new(reflected: &'a ReflectedType) -> Self {
        Self {
            inner: Bindings::new(reflected),
        }
    }

    /// Bind a column with no overrides.
    pub fn prop(&mut self, selector: impl FnOnce(&T::Props<T>) -> Prop<T>) -> OrmResult<&mut Self> {
        self.exp(selector, None, None)
    }

    /// `column = @param`.
    pub fn with(&mut self, selector: impl FnOnce(&T::Props<T>) -> Prop<T>) -> OrmResult<&mut Self> {
        self.exp(selector, None, None)
    }

    /// General form: optional literal value and/or operator.
    pub fn exp(
        &mut self,
        selector: impl FnOnce(&T::Props<T>) -> Prop<T>,
        value: Option<&str>,
        operator: Option<&str>,
    ) -> OrmResult<&mut Self> {
        self.inner.bind(selector, value, operator)?;
        Ok(self)
    }

    /// `column IS NULL`.
    pub fn is_null(&mut self, selector: impl FnOnce(&T::Props<T>) -> Prop<T>) -> OrmResult<&mut Self> {
        self.exp(selector, Some("NULL"), Some("IS"))
    }

    /// `column IS NOT NULL`.
    pub fn is_not_null(
        &mut self,
        selector: impl FnOnce(&T::Props<T>) -> Prop<T>,
    ) -> OrmResult<&mut Self> {
        self.exp(selector, Some("NULL"), Some("IS NOT"))
    }

    pub fn bindings(&self) -> &[PropertyBinding<'a>] {
        &self.inner.bound
    }

    pub fn len(&self) -> usize {
        self.inner.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bound.is_empty()
    }

    pub fn into_bindings(self) -> Vec<PropertyBinding<'a>> {
        self.inner.bound
    }
}

/// Names columns without predicates: SET targets and conflict columns.
pub struct PropBinder<'a, T: Entity> {
    inner: Bindings<'a, T>,
}

impl<'a, T: Entity> PropBinder<'a, T> {
    pub fn new(reflected: &'a ReflectedType) -> Self {
        Self {
            inner: Bindings::new(reflected),
        }
    }

    pub fn prop(&mut self, selector: impl FnOnce(&T::Props<T>) -> Prop<T>) -> OrmResult<&mut Self> {
        self.inner.bind(selector, None, None)?;
        Ok(self)
    }

    pub fn bindings(&self) -> &[PropertyBinding<'a>] {
        &self.inner.bound
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bound.is_empty()
    }

    pub fn into_bindings(self) -> Vec<PropertyBinding<'a>> {
        self.inner.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityDef;

    struct Account;

    struct AccountProps<E> {
        id: Prop<E>,
        email: Prop<E>,
        deleted_at: Prop<E>,
        secret: Prop<E>,
    }

    impl Entity for Account {
        type Props<E: 'static> = AccountProps<E>;

        fn props<E: 'static>() -> Self::Props<E> {
            AccountProps {
                id: Prop::new("Id"),
                email: Prop::new("EmailAddress"),
                deleted_at: Prop::new("DeletedAt"),
                secret: Prop::new("Secret"),
            }
        }

        fn entity_def() -> EntityDef {
            EntityDef::of::<Account>()
                .column(ColumnDescriptor::new("Id").primary_key())
                .column(ColumnDescriptor::new("EmailAddress").with_name("Email"))
                .column(ColumnDescriptor::new("DeletedAt"))
                .column(ColumnDescriptor::new("Secret").ignored())
        }
    }

    fn reflected() -> ReflectedType {
        ReflectedType::reflect(Account::entity_def())
    }

    #[test]
    fn bindings_keep_call_order() {
        let reflected = reflected();
        let mut w = ExprBuilder::<Account>::new(&reflected);
        w.with(|p| p.email)
            .unwrap()
            .is_null(|p| p.deleted_at)
            .unwrap()
            .is_not_null(|p| p.id)
            .unwrap();

        let bound = w.into_bindings();
        let names: Vec<_> = bound.iter().map(|b| b.column.name.as_str()).collect();
        assert_eq!(names, ["Email", "DeletedAt", "Id"]);
        assert_eq!(bound[0].operator, None);
        assert_eq!(bound[1].operator.as_deref(), Some("IS"));
        assert_eq!(bound[1].value.as_deref(), Some("NULL"));
        assert_eq!(bound[2].operator.as_deref(), Some("IS NOT"));
    }

    #[test]
    fn exp_carries_overrides() {
        let reflected = reflected();
        let mut w = ExprBuilder::<Account>::new(&reflected);
        w.exp(|p| p.id, Some("42"), Some(">")).unwrap();
        assert_eq!(w.len(), 1);
        assert_eq!(w.bindings()[0].value.as_deref(), Some("42"));
        assert_eq!(w.bindings()[0].operator.as_deref(), Some(">"));
    }

    #[test]
    fn ignored_member_fails_at_bind_time() {
        let reflected = reflected();
        let mut w = ExprBuilder::<Account>::new(&reflected);
        let err = w.with(|p| p.secret).err().unwrap();
        assert_eq!(err, OrmError::invalid_property("Account", "Secret"));
        assert!(w.is_empty());

        let mut set = PropBinder::<Account>::new(&reflected);
        assert!(set.prop(|p| p.secret).is_err());
    }

    #[test]
    fn prop_binder_has_no_overrides() {
        let reflected = reflected();
        let mut set = PropBinder::<Account>::new(&reflected);
        set.prop(|p| p.email).unwrap().prop(|p| p.deleted_at).unwrap();
        assert!(!set.is_empty());
        assert!(
            set.bindings()
                .iter()
                .all(|b| b.value.is_none() && b.operator.is_none())
        );
    }
}
