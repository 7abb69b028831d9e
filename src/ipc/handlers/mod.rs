pub mod assessments;
pub mod core;
pub mod courses;
pub mod exports;
pub mod shards;
pub mod weights;
