//! Issuer identity, resolution fallback and note-period settings.

use serde::Deserialize;

/// Fixed address block printed for support-document suppliers.
#[derive(Debug, Clone, Deserialize)]
pub struct FixedAddressConfig {
    #[serde(default = "default_municipality_code")]
    pub municipality_code: String,
    #[serde(default = "default_municipality_name")]
    pub municipality_name: String,
    #[serde(default = "default_department_code")]
    pub department_code: String,
    #[serde(default = "default_department_name")]
    pub department_name: String,
    #[serde(default = "default_address_line")]
    pub line: String,
    #[serde(default = "default_postal_code")]
    pub postal_code: String,
}

fn default_municipality_code() -> String {
    "11001".into()
}

fn default_municipality_name() -> String {
    "Bogotá, D.C.".into()
}

fn default_department_code() -> String {
    "11".into()
}

fn default_department_name() -> String {
    "Bogotá".into()
}

fn default_address_line() -> String {
    "Av. Carrera 45 No. 94 - 72".into()
}

fn default_postal_code() -> String {
    "110221".into()
}

impl Default for FixedAddressConfig {
    fn default() -> Self {
        Self {
            municipality_code: default_municipality_code(),
            municipality_name: default_municipality_name(),
            department_code: default_department_code(),
            department_name: default_department_name(),
            line: default_address_line(),
            postal_code: default_postal_code(),
        }
    }
}

/// Identity of the issuing company (OFE) and of the event generator.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuerConfig {
    /// Issuer NIT used by the query and Radian endpoints.
    #[serde(default)]
    pub nit: String,
    /// Registered company name.
    #[serde(default = "default_issuer_name")]
    pub name: String,
    #[serde(default)]
    pub generator_first_name: String,
    #[serde(default)]
    pub generator_last_name: String,
    #[serde(default)]
    pub generator_id: String,
    /// Address printed in the supplier contact block.
    #[serde(default = "default_notification_email")]
    pub notification_email: String,
    /// Offset appended to issue times that carry none.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default)]
    pub supplier_address: FixedAddressConfig,
}

fn default_issuer_name() -> String {
    "Positiva".into()
}

fn default_notification_email() -> String {
    "facturacion.electronica@positiva.gov.co".into()
}

fn default_utc_offset() -> String {
    "-05:00".into()
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            nit: String::new(),
            name: default_issuer_name(),
            generator_first_name: String::new(),
            generator_last_name: String::new(),
            generator_id: String::new(),
            notification_email: default_notification_email(),
            utc_offset: default_utc_offset(),
            supplier_address: FixedAddressConfig::default(),
        }
    }
}

/// Hard-coded resolution used while resolutions are administratively disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub authorization: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Period emitted on credit notes without reference (customization 22).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditNotePeriodConfig {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub end_time: String,
}

impl CreditNotePeriodConfig {
    /// Both a start and an end date are configured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.start_date.trim().is_empty() && !self.end_date.trim().is_empty()
    }
}
