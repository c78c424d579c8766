use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::student;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "school")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Student,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Student => Entity::has_many(student::Entity).into() }
    }
}

impl Related<student::Entity> for Entity {
    fn to() -> RelationDef { Relation::Student.def() }
}

impl ActiveModelBehavior for ActiveModel {}
