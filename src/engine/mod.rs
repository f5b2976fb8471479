//! Core engine: assembles conditions reports and exports from the data
//! sources, scoring strategies and observation log.

pub mod conditions;
