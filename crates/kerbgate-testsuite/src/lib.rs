//! Test fixtures shared by the kerbgate integration tests.

pub mod mock;
pub mod wire;
