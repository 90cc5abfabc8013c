//! Integration test common infrastructure.
//!
//! Provides an in-process test server and in-memory fakes for every hosted
//! service the handlers talk to.

pub mod fakes;
pub mod server;

#[allow(unused_imports)]
pub use fakes::{FakeExtractor, FakeMessenger, FakeModel, FakeStore, FakeVerifier, Harness};
#[allow(unused_imports)]
pub use server::{TestServer, test_config};
