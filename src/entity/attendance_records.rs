//! 考勤记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub batch_id: i64,
    pub course_id: i64,
    pub faculty_id: i64,
    // 日期当天 UTC 零点的时间戳
    pub date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::batches::Entity",
        from = "Column::BatchId",
        to = "super::batches::Column::Id"
    )]
    Batch,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FacultyId",
        to = "super::users::Column::Id"
    )]
    Faculty,
    #[sea_orm(has_many = "super::attendance_entries::Entity")]
    Entries,
}

impl Related<super::batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Faculty.def()
    }
}

impl Related<super::attendance_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型，entries 需按 position 排好序
impl Model {
    pub fn into_record(
        self,
        entries: Vec<super::attendance_entries::Model>,
    ) -> crate::models::attendance::entities::AttendanceRecord {
        use crate::models::attendance::entities::AttendanceRecord;
        use crate::utils::date::timestamp_to_date;
        use chrono::{DateTime, Utc};

        AttendanceRecord {
            id: self.id,
            batch_id: self.batch_id,
            course_id: self.course_id,
            faculty_id: self.faculty_id,
            date: timestamp_to_date(self.date),
            records: entries.into_iter().map(|e| e.into_entry()).collect(),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
