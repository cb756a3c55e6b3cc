//! 预导入模块，方便使用

pub use super::attendance_entries::{
    ActiveModel as AttendanceEntryActiveModel, Entity as AttendanceEntries,
    Model as AttendanceEntryModel,
};
pub use super::attendance_records::{
    ActiveModel as AttendanceRecordActiveModel, Entity as AttendanceRecords,
    Model as AttendanceRecordModel,
};
pub use super::batch_course_assignments::{
    ActiveModel as AssignmentActiveModel, Entity as BatchCourseAssignments,
    Model as AssignmentModel,
};
pub use super::batches::{ActiveModel as BatchActiveModel, Entity as Batches, Model as BatchModel};
pub use super::courses::{
    ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
