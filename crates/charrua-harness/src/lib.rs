//! Charrua Bus Test Harness
//!
//! A scripted [`MockTransport`] standing in for the REST backend, plus
//! fixtures producing backend-shaped JSON. Used by the runtime and CLI test
//! suites.

pub mod fixtures;
pub mod mock_transport;

pub use mock_transport::{MockTransport, MockTransportConfig, Reply};
