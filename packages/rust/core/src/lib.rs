//! Core pipeline orchestration for nbreport.
//!
//! This crate ties together discovery, execution, and reporting into the
//! end-to-end `build_site` workflow.

pub mod pipeline;
