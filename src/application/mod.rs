//! Application services.
//!
//! [`flow`] holds the gates every upstream call passes through and
//! [`dispatch`] fans batches out through them.

pub mod dispatch;
pub mod flow;
