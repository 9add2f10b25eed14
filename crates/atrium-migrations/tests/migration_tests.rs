use atrium_entities::users;
use atrium_migrations::Migrator;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::{MigratorTrait, SchemaManager};

const TABLES: [&str; 5] = [
    "users",
    "workspaces",
    "user_workspaces",
    "feature_flags",
    "billing_subscriptions",
];

async fn connect() -> anyhow::Result<DatabaseConnection> {
    // A single connection keeps every query on the same in-memory database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    Ok(Database::connect(options).await?)
}

#[tokio::test]
async fn test_migration_up_creates_all_tables() -> anyhow::Result<()> {
    let db = connect().await?;
    Migrator::up(&db, None).await?;

    let manager = SchemaManager::new(&db);
    for table in TABLES {
        assert!(manager.has_table(table).await?, "missing table {}", table);
    }

    Ok(())
}

#[tokio::test]
async fn test_migrated_schema_accepts_entities() -> anyhow::Result<()> {
    let db = connect().await?;
    Migrator::up(&db, None).await?;

    let inserted = users::ActiveModel {
        email: Set("jane@acme.dev".to_string()),
        first_name: Set("Jane".to_string()),
        last_name: Set("Doe".to_string()),
        can_impersonate: Set(false),
        can_access_full_admin_panel: Set(true),
        ..Default::default()
    }
    .insert(&db)
    .await?;

    let loaded = users::Entity::find_by_id(inserted.id).one(&db).await?;
    assert_eq!(loaded.map(|u| u.email), Some("jane@acme.dev".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_migration_down_drops_tables() -> anyhow::Result<()> {
    let db = connect().await?;
    Migrator::up(&db, None).await?;
    Migrator::down(&db, None).await?;

    let manager = SchemaManager::new(&db);
    for table in TABLES {
        assert!(!manager.has_table(table).await?, "table {} still present", table);
    }

    Ok(())
}
