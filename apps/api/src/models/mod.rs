pub mod candidate;
pub mod report;
pub mod session;
