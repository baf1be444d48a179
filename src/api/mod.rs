pub mod attendance;
pub mod hr;
pub mod me;
