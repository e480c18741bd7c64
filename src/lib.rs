pub mod collection;
pub mod commands;
pub mod config;
pub mod error;
pub mod fields;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod output;
pub mod recurrence;
pub mod sink;
