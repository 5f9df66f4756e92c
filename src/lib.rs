pub mod engine;
pub mod groups;
pub mod holiday;
pub mod limits;
pub mod model;
pub mod observability;
pub mod report;
pub mod snapshot;
