use async_trait::async_trait;
use atrium_core::DBDateTime;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub display_name: Option<String>,
    pub logo: Option<String>,
    #[sea_orm(unique)]
    pub subdomain: String,
    pub custom_domain: Option<String>,
    pub is_custom_domain_enabled: bool,
    pub allow_impersonation: bool,
    pub created_at: DBDateTime,
    pub updated_at: DBDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_workspaces::Entity")]
    UserWorkspaces,
    #[sea_orm(has_many = "super::feature_flags::Entity")]
    FeatureFlags,
    #[sea_orm(has_many = "super::billing_subscriptions::Entity")]
    BillingSubscriptions,
}

impl Related<super::user_workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserWorkspaces.def()
    }
}

impl Related<super::feature_flags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeatureFlags.def()
    }
}

impl Related<super::billing_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingSubscriptions.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();

        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.updated_at.is_not_set() {
                self.updated_at = Set(now);
            }
        } else {
            self.updated_at = Set(now);
        }

        Ok(self)
    }
}
