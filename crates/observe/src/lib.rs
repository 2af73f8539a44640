//! Initialization of the tracing infrastructure shared by binaries and tests.

pub mod tracing;
