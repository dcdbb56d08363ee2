//! End-to-end tests of the release pipeline through the public API.

mod common;
mod release_tests;
