pub mod statistics;
pub mod submission;
pub mod validation;

pub use statistics::StatisticsService;
pub use submission::SubmissionService;
