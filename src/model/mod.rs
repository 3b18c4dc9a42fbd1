pub mod attendance;
pub mod network_info;
pub mod statistics;
