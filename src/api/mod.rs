pub mod attendance;
pub mod employee;
