//! Integration tests: the conditions pipeline and dashboard end to end,
//! driven by an in-memory weather provider.

mod dashboard;
mod pipeline;
mod stub_provider;
