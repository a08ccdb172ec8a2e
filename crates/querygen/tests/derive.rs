//! Attribute handling of `#[derive(Entity)]`.

#![allow(dead_code)]

use querygen::{CaseConvention, ColumnDescriptor, Entity, EntityDef, QueryService, TableDescriptor};

#[derive(Entity)]
#[orm(table = "users", schema = "main.app")]
struct User {
    #[orm(primary_key)]
    user_id: i64,
    #[orm(param = "login")]
    user_name: String,
    #[orm(column = "mail", unique)]
    email: String,
    r#type: String,
}

#[derive(Entity)]
#[orm(rename_all = "camelCase")]
#[orm(table = "events")]
struct Event {
    #[orm(id)]
    event_id: i64,
    #[orm(skip_update, value = "now()")]
    occurred_at: String,
}

#[derive(Entity)]
#[orm(rename_all = "SCREAMING_SNAKE_CASE")]
struct Legacy {
    #[orm(id)]
    row_id: i64,
}

#[test]
fn verbatim_names_and_schema_prefixes() {
    let def = User::entity_def();
    assert!(def.type_name.ends_with("::User"));
    assert_eq!(def.short_name, "User");
    assert_eq!(def.table_name.as_deref(), Some("users"));
    assert_eq!(def.prefixes, ["main", "app"]);

    assert_eq!(
        def.columns,
        [
            ColumnDescriptor::new("user_id").primary_key(),
            ColumnDescriptor::new("user_name").with_param("login"),
            ColumnDescriptor::new("email").with_name("mail").unique(),
            ColumnDescriptor::new("type"),
        ]
    );
}

#[test]
fn param_override_flows_into_sql() {
    let svc = QueryService::new();
    let sql = svc
        .select_where::<User>(
            |w| {
                w.with(|p| p.user_name)?.with(|p| p.r#type)?;
                Ok(())
            },
            None,
        )
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM [main].[app].[users] WHERE [user_name] = @login AND [type] = @type"
    );
    assert_eq!(sql.params, ["login", "type"]);
}

#[test]
fn rename_rules() {
    let names = |def: EntityDef| -> Vec<String> {
        def.columns.into_iter().map(|c| c.property).collect()
    };
    assert_eq!(names(Event::entity_def()), ["eventId", "occurredAt"]);
    assert_eq!(names(Legacy::entity_def()), ["ROW_ID"]);
}

#[test]
fn struct_attributes_merge() {
    let svc = QueryService::new();
    let table = svc.ty::<Event>().table();
    assert_eq!(table, TableDescriptor::new("events"));
}

#[test]
fn snake_case_service_over_camel_properties() {
    let svc = QueryService::builder()
        .case_change(CaseConvention::Snake)
        .build();
    assert_eq!(
        svc.insert::<Event>(None).unwrap(),
        "INSERT INTO [events] ([event_id], [occurred_at]) VALUES (@eventId, now())"
    );
    assert_eq!(
        svc.update::<Event>(None).unwrap(),
        "UPDATE [events] SET [event_id] = @eventId WHERE [event_id] = @eventId"
    );
}

#[test]
fn props_expose_property_names() {
    let props = User::props::<User>();
    assert_eq!(props.user_name.name(), "user_name");
    assert_eq!(props.email.name(), "email");
    let props = Event::props::<Event>();
    assert_eq!(props.occurred_at.name(), "occurredAt");
}
