pub mod breakdown;
pub mod context;
pub mod costs;
pub mod dispatch;
pub mod estimate;
pub mod models;
pub mod run;
pub mod status;
pub mod suites;

pub use dispatch::dispatch;
