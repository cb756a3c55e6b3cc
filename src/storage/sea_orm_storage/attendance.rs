use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::attendance_entries::{
    ActiveModel as EntryActiveModel, Column as EntryColumn, Entity as AttendanceEntries,
    Model as EntryModel,
};
use crate::entity::attendance_records::{ActiveModel, Column, Entity as AttendanceRecords};
use crate::errors::{AttendanceSystemError, Result};
use crate::models::attendance::{
    entities::{AttendanceEntry, AttendanceRecord, NewAttendance},
    requests::AttendanceListQuery,
};
use crate::utils::date::date_to_timestamp;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

fn entry_models(record_id: i64, records: &[AttendanceEntry]) -> Vec<EntryActiveModel> {
    records
        .iter()
        .enumerate()
        .map(|(position, entry)| EntryActiveModel {
            record_id: Set(record_id),
            position: Set(position as i32),
            student_id: Set(entry.student_id),
            status: Set(entry.status.to_string()),
            remark: Set(entry.remark.clone()),
            ..Default::default()
        })
        .collect()
}

async fn insert_entries<C: ConnectionTrait>(
    conn: &C,
    record_id: i64,
    records: &[AttendanceEntry],
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    AttendanceEntries::insert_many(entry_models(record_id, records))
        .exec(conn)
        .await
        .map_err(|e| AttendanceSystemError::from_db_err("写入考勤条目失败", e))?;
    Ok(())
}

impl SeaOrmStorage {
    /// 加载多条记录的条目，按提交顺序分组
    async fn entries_by_record(&self, record_ids: &[i64]) -> Result<HashMap<i64, Vec<EntryModel>>> {
        let mut grouped: HashMap<i64, Vec<EntryModel>> = HashMap::new();
        if record_ids.is_empty() {
            return Ok(grouped);
        }

        let entries = AttendanceEntries::find()
            .filter(EntryColumn::RecordId.is_in(record_ids.iter().copied()))
            .order_by_asc(EntryColumn::RecordId)
            .order_by_asc(EntryColumn::Position)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询考勤条目失败: {e}")))?;

        for entry in entries {
            grouped.entry(entry.record_id).or_default().push(entry);
        }
        Ok(grouped)
    }

    pub async fn find_attendance_impl(
        &self,
        batch_id: i64,
        course_id: i64,
        date: chrono::NaiveDate,
    ) -> Result<Option<AttendanceRecord>> {
        let record = AttendanceRecords::find()
            .filter(Column::BatchId.eq(batch_id))
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Date.eq(date_to_timestamp(date)))
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询考勤失败: {e}")))?;

        let Some(record) = record else {
            return Ok(None);
        };
        let mut entries = self.entries_by_record(&[record.id]).await?;
        let entries = entries.remove(&record.id).unwrap_or_default();
        Ok(Some(record.into_record(entries)))
    }

    /// 在一个事务中写入考勤记录和条目
    pub async fn create_attendance_impl(&self, new: NewAttendance) -> Result<AttendanceRecord> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let record = ActiveModel {
            batch_id: Set(new.batch_id),
            course_id: Set(new.course_id),
            faculty_id: Set(new.faculty_id),
            date: Set(date_to_timestamp(new.date)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AttendanceSystemError::from_db_err("创建考勤记录失败", e))?;

        insert_entries(&txn, record.id, &new.records).await?;

        txn.commit()
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("提交事务失败: {e}")))?;

        let mut created = record.into_record(Vec::new());
        created.records = new.records;
        Ok(created)
    }

    /// 在一个事务中替换考勤条目并更新时间
    pub async fn replace_attendance_entries_impl(
        &self,
        record_id: i64,
        records: Vec<AttendanceEntry>,
    ) -> Result<Option<AttendanceRecord>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let existing = AttendanceRecords::find_by_id(record_id)
            .one(&txn)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询考勤失败: {e}")))?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        AttendanceEntries::delete_many()
            .filter(EntryColumn::RecordId.eq(record_id))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("清除考勤条目失败: {e}")))?;

        insert_entries(&txn, record_id, &records).await?;

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());
        let updated = model
            .update(&txn)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("更新考勤记录失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("提交事务失败: {e}")))?;

        let mut replaced = updated.into_record(Vec::new());
        replaced.records = records;
        Ok(Some(replaced))
    }

    pub async fn get_attendance_by_id_impl(&self, record_id: i64) -> Result<Option<AttendanceRecord>> {
        let record = AttendanceRecords::find_by_id(record_id)
            .one(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询考勤失败: {e}")))?;

        let Some(record) = record else {
            return Ok(None);
        };
        let mut entries = self.entries_by_record(&[record.id]).await?;
        let entries = entries.remove(&record.id).unwrap_or_default();
        Ok(Some(record.into_record(entries)))
    }

    /// 按条件列出考勤，日期倒序
    pub async fn list_attendance_impl(
        &self,
        query: AttendanceListQuery,
    ) -> Result<Vec<AttendanceRecord>> {
        let mut select = AttendanceRecords::find();

        if let Some(batch_id) = query.batch_id {
            select = select.filter(Column::BatchId.eq(batch_id));
        }
        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }
        if let Some(faculty_id) = query.faculty_id {
            select = select.filter(Column::FacultyId.eq(faculty_id));
        }
        if let Some(start) = query.start_date {
            select = select.filter(Column::Date.gte(date_to_timestamp(start)));
        }
        if let Some(end) = query.end_date {
            select = select.filter(Column::Date.lte(date_to_timestamp(end)));
        }

        // 只保留包含该学生条目的记录
        if let Some(student_id) = query.student_id {
            let record_ids: Vec<i64> = AttendanceEntries::find()
                .filter(EntryColumn::StudentId.eq(student_id))
                .all(&self.db)
                .await
                .map_err(|e| {
                    AttendanceSystemError::database_operation(format!("查询学生考勤失败: {e}"))
                })?
                .into_iter()
                .map(|e| e.record_id)
                .collect();
            if record_ids.is_empty() {
                return Ok(Vec::new());
            }
            select = select.filter(Column::Id.is_in(record_ids));
        }

        let records = select
            .order_by_desc(Column::Date)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("查询考勤列表失败: {e}")))?;

        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        let mut entries = self.entries_by_record(&ids).await?;

        Ok(records
            .into_iter()
            .map(|r| {
                let rows = entries.remove(&r.id).unwrap_or_default();
                r.into_record(rows)
            })
            .collect())
    }

    /// 删除考勤记录，条目随之删除
    pub async fn delete_attendance_impl(&self, record_id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("开启事务失败: {e}")))?;

        AttendanceEntries::delete_many()
            .filter(EntryColumn::RecordId.eq(record_id))
            .exec(&txn)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("删除考勤条目失败: {e}")))?;

        let result = AttendanceRecords::delete_by_id(record_id)
            .exec(&txn)
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("删除考勤记录失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| AttendanceSystemError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::AttendanceStatus;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use chrono::NaiveDate;

    async fn seeded() -> (SeaOrmStorage, i64, i64, i64, i64) {
        let storage = SeaOrmStorage::connect_memory().await.unwrap();
        let batch = storage
            .create_batch_impl(crate::models::batches::requests::CreateBatchRequest {
                name: "CSE-2025".to_string(),
                year: 2025,
                department: "CSE".to_string(),
                semester: 1,
            })
            .await
            .unwrap();
        let course = storage
            .create_course_impl(crate::models::courses::requests::CreateCourseRequest {
                name: "Data Structures".to_string(),
                code: "CS201".to_string(),
                description: None,
                credits: None,
                department: "CSE".to_string(),
                semester: 1,
            })
            .await
            .unwrap();
        let faculty = storage
            .create_user_impl(CreateUserRequest {
                username: "faculty1".to_string(),
                email: "f1@college.edu".to_string(),
                role: UserRole::Teacher,
                profile_name: None,
                roll_number: None,
                batch_id: None,
            })
            .await
            .unwrap();
        let student = storage
            .create_user_impl(CreateUserRequest {
                username: "student1".to_string(),
                email: "s1@college.edu".to_string(),
                role: UserRole::Student,
                profile_name: None,
                roll_number: Some("R001".to_string()),
                batch_id: Some(batch.id),
            })
            .await
            .unwrap();
        (storage, batch.id, course.id, faculty.id, student.id)
    }

    fn new_attendance(batch_id: i64, course_id: i64, faculty_id: i64, student_id: i64) -> NewAttendance {
        NewAttendance {
            batch_id,
            course_id,
            faculty_id,
            date: NaiveDate::from_ymd_opt(2025, 11, 9).unwrap(),
            records: vec![AttendanceEntry {
                student_id,
                status: AttendanceStatus::Present,
                remark: None,
            }],
        }
    }

    #[actix_web::test]
    async fn test_unique_index_rejects_duplicate_key_without_precheck() {
        let (storage, batch_id, course_id, faculty_id, student_id) = seeded().await;

        storage
            .create_attendance_impl(new_attendance(batch_id, course_id, faculty_id, student_id))
            .await
            .unwrap();
        let err = storage
            .create_attendance_impl(new_attendance(batch_id, course_id, faculty_id, student_id))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // 失败的事务不留下任何记录
        let all = storage
            .list_attendance_impl(AttendanceListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].records.len(), 1);
    }

    #[actix_web::test]
    async fn test_missing_student_is_reference_error_not_conflict() {
        let (storage, batch_id, course_id, faculty_id, student_id) = seeded().await;

        let err = storage
            .create_attendance_impl(new_attendance(batch_id, course_id, faculty_id, student_id + 100))
            .await
            .unwrap_err();
        assert!(err.is_reference());
        assert!(!err.is_conflict());

        let created = storage
            .create_attendance_impl(new_attendance(batch_id, course_id, faculty_id, student_id))
            .await
            .unwrap();
        let err = storage
            .replace_attendance_entries_impl(
                created.id,
                vec![AttendanceEntry {
                    student_id: student_id + 100,
                    status: AttendanceStatus::Absent,
                    remark: None,
                }],
            )
            .await
            .unwrap_err();
        assert!(err.is_reference());

        // 替换失败后原条目保留
        let reloaded = storage.get_attendance_by_id_impl(created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.records.len(), 1);
        assert_eq!(reloaded.records[0].student_id, student_id);
    }

    #[actix_web::test]
    async fn test_replace_entries_keeps_record_identity() {
        let (storage, batch_id, course_id, faculty_id, student_id) = seeded().await;
        let created = storage
            .create_attendance_impl(new_attendance(batch_id, course_id, faculty_id, student_id))
            .await
            .unwrap();

        let replaced = storage
            .replace_attendance_entries_impl(
                created.id,
                vec![AttendanceEntry {
                    student_id,
                    status: AttendanceStatus::Late,
                    remark: Some("bus".to_string()),
                }],
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.id, created.id);

        let reloaded = storage.get_attendance_by_id_impl(created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.records.len(), 1);
        assert_eq!(reloaded.records[0].status, AttendanceStatus::Late);
        assert_eq!(reloaded.records[0].remark.as_deref(), Some("bus"));
    }

    #[actix_web::test]
    async fn test_delete_cascades_entries() {
        let (storage, batch_id, course_id, faculty_id, student_id) = seeded().await;
        let created = storage
            .create_attendance_impl(new_attendance(batch_id, course_id, faculty_id, student_id))
            .await
            .unwrap();

        assert!(storage.delete_attendance_impl(created.id).await.unwrap());
        assert!(!storage.delete_attendance_impl(created.id).await.unwrap());
        let by_student = storage
            .list_attendance_impl(AttendanceListQuery {
                student_id: Some(student_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(by_student.is_empty());
    }
}
