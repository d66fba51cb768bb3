//! End-to-end planning scenarios.
//!
//! Each test builds a source and a target snapshot the way a MySQL reader
//! would report them, builds the plan, and checks both the operations and
//! the rendered statements.

use schemasync_core::prelude::*;

// =============================================================================
// Fixtures
// =============================================================================

fn id() -> ColumnDefinition {
    ColumnDefinition::new("id", "int(11)")
        .not_null()
        .extra("auto_increment")
}

fn name(data_type: &str) -> ColumnDefinition {
    ColumnDefinition::new("name", data_type).not_null()
}

fn users(columns: Vec<ColumnDefinition>) -> TableSnapshot {
    columns
        .into_iter()
        .fold(TableSnapshot::new("users"), TableSnapshot::column)
}

fn sql(plan: &MigrationPlan) -> Vec<String> {
    MySqlDialect::new()
        .render_plan(plan)
        .into_iter()
        .map(|s| s.sql)
        .collect()
}

// =============================================================================
// Column scenarios
// =============================================================================

#[test]
fn new_trailing_column_is_added_after_previous() {
    let target = SchemaSnapshot::new().table(users(vec![id(), name("varchar(255)")]));
    let source = SchemaSnapshot::new().table(users(vec![
        id(),
        name("varchar(255)"),
        ColumnDefinition::new("email", "varchar(255)"),
    ]));

    let plan = build_plan(&source, &target).unwrap();
    assert_eq!(plan.len(), 1);
    match &plan.operations()[0] {
        TableOperation::AlterTable { name, operations } => {
            assert_eq!(name, "users");
            assert_eq!(operations.len(), 1);
            assert!(matches!(
                &operations[0],
                ColumnOperation::Add { column, after }
                    if column.name == "email" && after.as_deref() == Some("name")
            ));
        }
        other => panic!("Expected AlterTable, got {other:?}"),
    }
    assert_eq!(
        sql(&plan),
        vec!["ALTER TABLE `users` ADD COLUMN `email` varchar(255) NULL AFTER `name`"]
    );
}

#[test]
fn target_only_column_is_dropped() {
    let target = SchemaSnapshot::new().table(users(vec![
        id(),
        name("varchar(255)"),
        ColumnDefinition::new("legacy_flag", "tinyint(1)").default_value("0"),
    ]));
    let source = SchemaSnapshot::new().table(users(vec![id(), name("varchar(255)")]));

    let plan = build_plan(&source, &target).unwrap();
    assert_eq!(
        sql(&plan),
        vec!["ALTER TABLE `users` DROP COLUMN `legacy_flag`"]
    );
}

#[test]
fn changed_column_is_modified_to_source_definition() {
    let target = SchemaSnapshot::new().table(users(vec![
        id(),
        ColumnDefinition::new("name", "varchar(100)"),
    ]));
    let source = SchemaSnapshot::new().table(users(vec![id(), name("varchar(255)")]));

    let plan = build_plan(&source, &target).unwrap();
    assert_eq!(plan.operation_count(), 1);
    assert_eq!(
        sql(&plan),
        vec!["ALTER TABLE `users` MODIFY COLUMN `name` varchar(255) NOT NULL"]
    );
}

// =============================================================================
// Table scenarios
// =============================================================================

#[test]
fn full_sync_plan() {
    let target = SchemaSnapshot::new()
        .table(users(vec![
            id(),
            ColumnDefinition::new("name", "varchar(100)"),
            ColumnDefinition::new("legacy_flag", "tinyint(1)"),
        ]))
        .table(TableSnapshot::new("sessions").column(id()));
    let source = SchemaSnapshot::new()
        .table(users(vec![
            id(),
            name("varchar(255)"),
            ColumnDefinition::new("email", "varchar(255)"),
        ]))
        .table(
            TableSnapshot::new("posts")
                .column(id())
                .column(ColumnDefinition::new("title", "varchar(200)").not_null())
                .create_statement(
                    "CREATE TABLE `posts` (\n  `id` int(11) NOT NULL AUTO_INCREMENT,\n  \
                     `title` varchar(200) NOT NULL,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB",
                ),
        );

    let plan = build_plan(&source, &target).unwrap();
    assert!(plan.is_well_ordered());
    assert_eq!(
        sql(&plan),
        vec![
            "CREATE TABLE `posts` (\n  `id` int(11) NOT NULL AUTO_INCREMENT,\n  \
             `title` varchar(200) NOT NULL,\n  PRIMARY KEY (`id`)\n) ENGINE=InnoDB",
            "DROP TABLE `sessions`",
            "ALTER TABLE `users` MODIFY COLUMN `name` varchar(255) NOT NULL",
            "ALTER TABLE `users` ADD COLUMN `email` varchar(255) NULL AFTER `name`",
            "ALTER TABLE `users` DROP COLUMN `legacy_flag`",
        ]
    );

    let migrated = apply_plan(&target, &plan).unwrap();
    assert!(build_plan(&source, &migrated).unwrap().is_empty());
}

#[test]
fn reversed_plan_swaps_creates_and_drops() {
    let a = SchemaSnapshot::new()
        .table(users(vec![id()]))
        .table(TableSnapshot::new("posts").column(id()));
    let b = SchemaSnapshot::new()
        .table(users(vec![id()]))
        .table(TableSnapshot::new("logs").column(id()));

    let forward = build_plan(&a, &b).unwrap();
    let backward = build_plan(&b, &a).unwrap();
    assert_eq!(forward.creates().collect::<Vec<_>>(), backward.drops().collect::<Vec<_>>());
    assert_eq!(forward.drops().collect::<Vec<_>>(), backward.creates().collect::<Vec<_>>());
}

#[test]
fn invalid_snapshot_produces_no_plan() {
    let mut broken = users(vec![id(), name("varchar(255)")]);
    broken.columns[1].name = "id".to_string();
    let source = SchemaSnapshot::new().table(broken);

    let result = build_plan(&source, &SchemaSnapshot::new());
    assert!(matches!(result, Err(PlanError::InvalidInput(_))));
}

#[test]
fn plan_round_trips_through_json() {
    let target = SchemaSnapshot::new().table(users(vec![id()]));
    let source = SchemaSnapshot::new().table(users(vec![id(), name("varchar(255)")]));
    let plan = build_plan(&source, &target).unwrap();

    let json = serde_json::to_string(&plan).unwrap();
    let decoded: MigrationPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, plan);
}
