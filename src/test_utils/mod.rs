//! Test utilities for use-case and route testing.
//!
//! This module provides:
//! - Test data factories for webhook payloads, the plan catalog and config
//! - In-memory implementations of the CRM and payment gateway ports
//! - A builder for constructing `AppState` with test dependencies

mod app_state_builder;
mod crm_mocks;
mod factories;
mod payment_mocks;

pub use app_state_builder::*;
pub use crm_mocks::*;
pub use factories::*;
pub use payment_mocks::*;
