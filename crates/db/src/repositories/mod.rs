//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row atomic paths
//! take `&mut Transaction` instead so the bulk engine controls the
//! commit boundary.

pub mod batch_repo;
pub mod bulk_operation_repo;
pub mod exam_period_repo;
pub mod faculty_repo;
pub mod holiday_repo;
pub mod subject_repo;
pub mod template_repo;
pub mod time_slot_repo;
pub mod timetable_entry_repo;
pub mod undo_repo;

pub use batch_repo::BatchRepo;
pub use bulk_operation_repo::BulkOperationRepo;
pub use exam_period_repo::ExamPeriodRepo;
pub use faculty_repo::FacultyRepo;
pub use holiday_repo::HolidayRepo;
pub use subject_repo::SubjectRepo;
pub use template_repo::TemplateRepo;
pub use time_slot_repo::TimeSlotRepo;
pub use timetable_entry_repo::TimetableEntryRepo;
pub use undo_repo::UndoRepo;
