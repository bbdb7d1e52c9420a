use schemata_core::{Column, ColumnId, ColumnType, Error, Schema, Table, TableId};

fn column(name: &str) -> Column {
    Column::new(name, ColumnType::new("integer"))
}

fn table_with(schema: &mut Schema, name: &str, columns: &[&str]) -> Vec<ColumnId> {
    let table = schema.add_table(Table::new(name)).expect("add table");
    columns
        .iter()
        .map(|name| schema.add_column(table, column(name)).expect("add column"))
        .collect()
}

#[test]
fn last_primary_key_call_wins() {
    let mut schema = Schema::new("public");
    let ids = table_with(&mut schema, "users", &["id", "code", "email"]);

    for id in &ids {
        schema.constraints(*id).add_primary_key(None).expect("pk");
    }

    let table = schema.find_table("users").unwrap();
    let pk = table.primary_key.as_ref().expect("primary key");
    assert_eq!(pk.columns, vec!["email".to_string()]);
    for column in &table.columns {
        assert!(column.is_primary_key, "{} keeps its flag", column.name);
        assert!(!column.nullable);
    }
}

#[test]
fn primary_key_flag_of_untouched_columns_stays_clear() {
    let mut schema = Schema::new("public");
    let ids = table_with(&mut schema, "users", &["id", "email"]);

    schema.constraints(ids[0]).add_primary_key(Some("pk_users")).expect("pk");

    let email = schema.column(ids[1]).unwrap();
    assert!(!email.is_primary_key);
    assert!(email.nullable);
}

#[test]
fn at_most_one_identity_per_table() {
    let mut schema = Schema::new("public");
    let ids = table_with(&mut schema, "events", &["id", "seq", "legacy"]);
    let other = table_with(&mut schema, "audit", &["id"]);

    schema.constraints(other[0]).add_identity().expect("identity");
    for id in [ids[0], ids[2], ids[1]] {
        schema.constraints(id).add_identity().expect("identity");
    }

    let events = schema.find_table("events").unwrap();
    let identities: Vec<&str> = events
        .columns
        .iter()
        .filter(|column| column.is_identity)
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(identities, vec!["seq"]);
    // identity is tracked per table
    assert!(schema.column(other[0]).unwrap().is_identity);
}

#[test]
fn identity_is_idempotent() {
    let mut once = Schema::new("public");
    let once_ids = table_with(&mut once, "events", &["id", "seq"]);
    once.constraints(once_ids[0]).add_identity().expect("identity");

    let mut twice = Schema::new("public");
    let twice_ids = table_with(&mut twice, "events", &["id", "seq"]);
    twice
        .constraints(twice_ids[0])
        .add_identity()
        .and_then(|column| column.add_identity())
        .expect("identity");

    let once_json = serde_json::to_value(&once).unwrap();
    let twice_json = serde_json::to_value(&twice).unwrap();
    assert_eq!(once_json, twice_json);
}

#[test]
fn foreign_key_to_existing_table_is_visible_as_child() {
    let mut schema = Schema::new("public");
    table_with(&mut schema, "orders", &["id"]);
    let lines = table_with(&mut schema, "order_lines", &["id", "order_id"]);

    schema
        .constraints(lines[1])
        .add_foreign_key(Some("fk_lines_orders"), "orders")
        .expect("fk");

    let children: Vec<&str> = schema
        .foreign_key_children("orders")
        .into_iter()
        .map(|table| table.name.as_str())
        .collect();
    assert_eq!(children, vec!["order_lines"]);
    assert!(schema.foreign_key_index().has_children("orders"));
}

#[test]
fn foreign_key_to_missing_table_keeps_forward_reference_only() {
    let mut schema = Schema::new("public");
    let lines = table_with(&mut schema, "order_lines", &["order_id"]);

    schema
        .constraints(lines[0])
        .add_foreign_key(None, "orders")
        .expect("fk");

    let table = schema.find_table("order_lines").unwrap();
    assert_eq!(
        table.foreign_keys[0].refers_to_table.as_deref(),
        Some("orders")
    );
    for table in schema.tables() {
        assert!(schema.foreign_key_children(&table.name).is_empty());
    }
    assert!(schema.foreign_key_children("orders").is_empty());
    assert!(schema.foreign_key_index().is_empty());
}

#[test]
fn children_appear_once_the_target_table_is_added() {
    let mut schema = Schema::new("public");
    let lines = table_with(&mut schema, "order_lines", &["order_id"]);
    schema
        .constraints(lines[0])
        .add_foreign_key(None, "orders")
        .expect("fk");

    table_with(&mut schema, "orders", &["id"]);

    let children = schema.foreign_key_children("orders");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "order_lines");
}

#[test]
fn foreign_and_unique_keys_accumulate() {
    let mut schema = Schema::new("public");
    table_with(&mut schema, "users", &["id"]);
    let ids = table_with(&mut schema, "orders", &["buyer_id", "seller_id", "code"]);

    schema
        .constraints(ids[0])
        .add_foreign_key(None, "users")
        .and_then(|column| column.add_unique_key(None))
        .expect("buyer");
    schema
        .constraints(ids[1])
        .add_foreign_key_by(None, |tables| tables.iter().find(|t| t.name == "users"))
        .expect("seller");
    schema.constraints(ids[2]).add_unique_key(Some("uk_code")).expect("code");

    let orders = schema.find_table("orders").unwrap();
    assert_eq!(orders.foreign_keys.len(), 2);
    assert_eq!(orders.unique_keys.len(), 2);
    assert_eq!(orders.unique_keys[1].name.as_deref(), Some("uk_code"));
    assert!(orders.primary_key.is_none());
    // one child entry per referencing table
    assert_eq!(schema.foreign_key_children("users").len(), 1);
}

#[test]
fn invalid_arguments_leave_state_untouched() {
    let mut schema = Schema::new("public");
    let ids = table_with(&mut schema, "orders", &["id"]);
    let detached = ColumnId {
        table: TableId(3),
        index: 0,
    };

    let err = schema
        .constraints(detached)
        .add_primary_key(None)
        .err()
        .expect("detached column");
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = schema
        .constraints(ids[0])
        .add_foreign_key(None, "")
        .err()
        .expect("empty target");
    assert!(matches!(err, Error::InvalidArgument(_)));

    let err = schema
        .constraints(detached)
        .add_foreign_key_by(None, |tables| tables.first())
        .err()
        .expect("detached column");
    assert!(matches!(err, Error::InvalidArgument(_)));

    let table = schema.find_table("orders").unwrap();
    assert!(table.primary_key.is_none());
    assert!(table.foreign_keys.is_empty());
    assert!(!table.columns[0].is_foreign_key);
}
