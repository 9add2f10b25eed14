//! Test utilities for database integration tests
//!
//! Every `TestDatabase` is a private in-memory SQLite database with the full schema
//! applied, so tests can run in parallel without sharing state. The fixture helpers
//! insert the rows most service tests start from.

use crate::DbConnection;
use atrium_entities::{billing_subscriptions, feature_flags, user_workspaces, users, workspaces};
use atrium_entities::{FeatureFlagKey, SubscriptionStatus};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use atrium_migrations::Migrator;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestDatabase {
    pub db: Arc<DbConnection>,
}

impl TestDatabase {
    /// Fresh database without any tables
    pub async fn new() -> anyhow::Result<Self> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(options).await?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Fresh database with every migration applied
    pub async fn with_migrations() -> anyhow::Result<Self> {
        let test_db = Self::new().await?;
        Migrator::up(test_db.db.as_ref(), None).await?;
        Ok(test_db)
    }

    pub fn connection(&self) -> &DbConnection {
        self.db.as_ref()
    }

    pub fn connection_arc(&self) -> Arc<DbConnection> {
        self.db.clone()
    }

    pub async fn create_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<users::Model, DbErr> {
        users::ActiveModel {
            email: Set(email.to_string()),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            can_impersonate: Set(false),
            can_access_full_admin_panel: Set(false),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }

    /// Admin user holding every admin capability
    pub async fn create_admin(&self, email: &str) -> Result<users::Model, DbErr> {
        users::ActiveModel {
            email: Set(email.to_string()),
            first_name: Set("Admin".to_string()),
            last_name: Set("User".to_string()),
            can_impersonate: Set(true),
            can_access_full_admin_panel: Set(true),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }

    pub async fn create_workspace(
        &self,
        display_name: Option<&str>,
        subdomain: &str,
        allow_impersonation: bool,
    ) -> Result<workspaces::Model, DbErr> {
        workspaces::ActiveModel {
            display_name: Set(display_name.map(str::to_string)),
            logo: Set(None),
            subdomain: Set(subdomain.to_string()),
            custom_domain: Set(None),
            is_custom_domain_enabled: Set(false),
            allow_impersonation: Set(allow_impersonation),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }

    pub async fn add_member(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<user_workspaces::Model, DbErr> {
        user_workspaces::ActiveModel {
            user_id: Set(user_id),
            workspace_id: Set(workspace_id),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }

    pub async fn set_feature_flag(
        &self,
        workspace_id: Uuid,
        key: FeatureFlagKey,
        value: bool,
    ) -> Result<feature_flags::Model, DbErr> {
        feature_flags::ActiveModel {
            workspace_id: Set(workspace_id),
            key: Set(key.as_str().to_string()),
            value: Set(value),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }

    pub async fn create_subscription(
        &self,
        workspace_id: Uuid,
        stripe_customer_id: Option<&str>,
        stripe_subscription_id: &str,
    ) -> Result<billing_subscriptions::Model, DbErr> {
        billing_subscriptions::ActiveModel {
            workspace_id: Set(workspace_id),
            stripe_customer_id: Set(stripe_customer_id.map(str::to_string)),
            stripe_subscription_id: Set(stripe_subscription_id.to_string()),
            status: Set(SubscriptionStatus::Active),
            ..Default::default()
        }
        .insert(self.connection())
        .await
    }
}
