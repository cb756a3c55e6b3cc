use sea_orm_migration::prelude::*;

use crate::m20251101_000001_create_directory_tables::{Batches, Courses, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 批次-课程-教师分配表 ====================
        manager
            .create_table(
                Table::create()
                    .table(BatchCourseAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BatchCourseAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BatchCourseAssignments::BatchId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchCourseAssignments::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchCourseAssignments::FacultyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchCourseAssignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchCourseAssignments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BatchCourseAssignments::Table, BatchCourseAssignments::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                BatchCourseAssignments::Table,
                                BatchCourseAssignments::CourseId,
                            )
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                BatchCourseAssignments::Table,
                                BatchCourseAssignments::FacultyId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 考勤记录表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::BatchId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::FacultyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::Date)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::BatchId)
                            .to(Batches::Table, Batches::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceRecords::Table, AttendanceRecords::FacultyId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 考勤明细表 ====================
        manager
            .create_table(
                Table::create()
                    .table(AttendanceEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEntries::RecordId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEntries::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEntries::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceEntries::Status).string().not_null())
                    .col(ColumnDef::new(AttendanceEntries::Remark).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceEntries::Table, AttendanceEntries::RecordId)
                            .to(AttendanceRecords::Table, AttendanceRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceEntries::Table, AttendanceEntries::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一约束：每个批次-课程只能有一位教师
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_assignments_batch_course")
                    .table(BatchCourseAssignments::Table)
                    .col(BatchCourseAssignments::BatchId)
                    .col(BatchCourseAssignments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_faculty_id")
                    .table(BatchCourseAssignments::Table)
                    .col(BatchCourseAssignments::FacultyId)
                    .to_owned(),
            )
            .await?;

        // 唯一约束：每个批次-课程-日期只能有一条考勤记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_attendance_batch_course_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::BatchId)
                    .col(AttendanceRecords::CourseId)
                    .col(AttendanceRecords::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_date")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::Date)
                    .to_owned(),
            )
            .await?;

        // 同一条记录中学生不能重复
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_attendance_entries_record_student")
                    .table(AttendanceEntries::Table)
                    .col(AttendanceEntries::RecordId)
                    .col(AttendanceEntries::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_entries_student_id")
                    .table(AttendanceEntries::Table)
                    .col(AttendanceEntries::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(BatchCourseAssignments::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum BatchCourseAssignments {
    #[sea_orm(iden = "batch_course_assignments")]
    Table,
    Id,
    BatchId,
    CourseId,
    FacultyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AttendanceRecords {
    #[sea_orm(iden = "attendance_records")]
    Table,
    Id,
    BatchId,
    CourseId,
    FacultyId,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AttendanceEntries {
    #[sea_orm(iden = "attendance_entries")]
    Table,
    Id,
    RecordId,
    Position,
    StudentId,
    Status,
    Remark,
}
