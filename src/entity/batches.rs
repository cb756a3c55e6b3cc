//! 批次实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub year: i32,
    pub department: String,
    pub semester: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::users::Entity")]
    Students,
    #[sea_orm(has_many = "super::batch_course_assignments::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::attendance_records::Entity")]
    AttendanceRecords,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::batch_course_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::attendance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_batch(self) -> crate::models::batches::entities::Batch {
        use crate::models::batches::entities::Batch;
        use chrono::{DateTime, Utc};

        Batch {
            id: self.id,
            name: self.name,
            year: self.year,
            department: self.department,
            semester: self.semester,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }

    pub fn into_summary(self) -> crate::models::batches::entities::BatchSummary {
        crate::models::batches::entities::BatchSummary {
            id: self.id,
            name: self.name,
            year: self.year,
            department: self.department,
            semester: self.semester,
        }
    }
}
