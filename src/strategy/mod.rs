//! Decision logic: viewing suitability scoring, historical analytics and
//! the offline forecast strategies. Everything here is pure apart from the
//! injected random source.

pub mod analytics;
pub mod forecast;
pub mod suitability;
