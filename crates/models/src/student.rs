use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::school;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    /// Always stored lower-cased.
    #[sea_orm(unique)]
    pub email: String,
    pub school_id: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    School,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::School => Entity::belongs_to(school::Entity)
                .from(Column::SchoolId)
                .to(school::Column::Id)
                .into(),
        }
    }
}

impl Related<school::Entity> for Entity {
    fn to() -> RelationDef { Relation::School.def() }
}

impl ActiveModelBehavior for ActiveModel {}
