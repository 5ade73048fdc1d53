//! In-memory adapters.

pub mod customers;

pub use customers::InMemoryCustomers;
