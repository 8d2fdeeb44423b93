//! Unit test suite entry point.

mod config_tests;
mod profile_tests;
mod scenario_tests;
mod service_tests;
mod store_tests;
