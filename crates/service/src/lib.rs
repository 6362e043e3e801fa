//! Service layer providing the catalog, review, and account operations on
//! top of a record store abstraction.
//! - Separates business logic from the HTTP surface and from the driver.
//! - Reuses record definitions and validation from the `models` crate.
//! - Provides clear error types and shaped result objects per operation.

pub mod account;
pub mod catalog;
pub mod errors;
pub mod review;
pub mod store;
