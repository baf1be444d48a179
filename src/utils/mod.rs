pub mod clock;
pub mod db_utils;
pub mod org_time;
pub mod upload;
