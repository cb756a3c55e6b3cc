pub mod assignments;

pub mod attendance;

pub mod batches;

pub mod courses;

pub mod users;

pub use assignments::configure_assignment_routes;
pub use attendance::configure_attendance_routes;
pub use batches::configure_batch_routes;
pub use courses::configure_course_routes;
pub use users::configure_user_routes;
