//! Test utilities for polystore integration tests
//!
//! `CatalogFixture` opens an isolated in-memory catalog with two deployed
//! store adapters and one relational namespace already committed.

pub mod fixture;
