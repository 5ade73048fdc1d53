//! Customer directory held in memory, loaded from a JSON export.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::event::validate_email;
use crate::domain::Nit;
use crate::error::Result;
use crate::port::{CustomerDirectory, CustomerRecord};

/// Registered customers keyed by base NIT.
#[derive(Debug, Default)]
pub struct InMemoryCustomers {
    records: RwLock<HashMap<String, CustomerRecord>>,
}

impl InMemoryCustomers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `records`, validating their notification addresses.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first malformed address.
    pub fn from_records(records: impl IntoIterator<Item = CustomerRecord>) -> Result<Self> {
        let directory = Self::new();
        for record in records {
            directory.insert(record)?;
        }
        Ok(directory)
    }

    /// Parse a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or an address is invalid.
    pub fn from_json(content: &str) -> Result<Self> {
        let records: Vec<CustomerRecord> = serde_json::from_str(content)?;
        Self::from_records(records)
    }

    /// Load a JSON array of records from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let directory = Self::from_json(&content)?;
        info!(
            path = %path.as_ref().display(),
            customers = directory.len(),
            "Loaded customer directory"
        );
        Ok(directory)
    }

    /// Add or replace a record. The key is the base NIT, any check digit is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed notification address.
    pub fn insert(&self, mut record: CustomerRecord) -> Result<()> {
        for email in record
            .notification_emails
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
        {
            validate_email(email)?;
        }
        let nit = Nit::parse(&record.nit);
        record.nit = nit.base().to_string();
        debug!(nit = %record.nit, "Registered customer");
        self.records.write().insert(record.nit.clone(), record);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl CustomerDirectory for InMemoryCustomers {
    fn find(&self, nit_base: &str) -> Option<CustomerRecord> {
        self.records.read().get(nit_base.trim()).cloned()
    }
}
