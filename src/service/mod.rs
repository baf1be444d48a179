pub mod attendance;
pub mod query;

pub use attendance::AttendanceService;
