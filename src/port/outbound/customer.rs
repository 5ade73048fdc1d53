//! Customer (acquirer) directory port.
//!
//! The relational customer store itself lives outside this crate; the
//! transformer only needs a synchronous lookup to enrich acquirer data.

use serde::{Deserialize, Serialize};

/// What the directory knows about an acquirer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerRecord {
    /// NIT without check digit.
    pub nit: String,
    /// Tax-document type code (31 = NIT, 13 = cédula, ...).
    pub id_type: String,
    /// Juridical organisation code (1 = legal entity, 2 = natural person).
    pub organization_type: String,
    /// Comma separated notification addresses registered for the customer.
    pub notification_emails: String,
}

/// Lookup of registered customers by base NIT.
pub trait CustomerDirectory: Send + Sync {
    fn find(&self, nit_base: &str) -> Option<CustomerRecord>;
}
