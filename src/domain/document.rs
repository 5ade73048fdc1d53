//! Canonical internal document model.
//!
//! Every document the gateway dispatches arrives in this shape regardless of
//! the caller. Amounts are kept as decimal strings (two fractional digits) the
//! same way callers send them; [`super::money`] parses them when arithmetic
//! is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of electronic document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Factura de venta.
    #[serde(rename = "FC")]
    Invoice,
    /// Nota crédito.
    #[serde(rename = "NC")]
    CreditNote,
    /// Nota débito.
    #[serde(rename = "ND")]
    DebitNote,
    /// Documento soporte (purchase from a non-obligated provider).
    #[serde(rename = "DS")]
    SupportDocument,
}

impl DocumentKind {
    /// Short code used on the wire and in batch replies.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Invoice => "FC",
            Self::CreditNote => "NC",
            Self::DebitNote => "ND",
            Self::SupportDocument => "DS",
        }
    }

    /// Default `CustomizationID` when the document does not carry one.
    #[must_use]
    pub const fn default_customization(self) -> &'static str {
        match self {
            Self::Invoice | Self::SupportDocument => "10",
            Self::CreditNote => "22",
            Self::DebitNote => "32",
        }
    }

    /// Default `InvoiceTypeCode`; support documents always use `05`.
    #[must_use]
    pub const fn default_invoice_type_code(self) -> &'static str {
        match self {
            Self::Invoice => "01",
            Self::CreditNote => "91",
            Self::DebitNote => "92",
            Self::SupportDocument => "05",
        }
    }

    /// True for credit and debit notes.
    #[must_use]
    pub const fn is_note(self) -> bool {
        matches!(self, Self::CreditNote | Self::DebitNote)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Authorization range a document is emitted under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resolution {
    pub authorization: String,
    pub start_date: String,
    pub end_date: String,
    pub prefix: String,
    pub from: String,
    pub to: String,
}

/// Postal address of a party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// DIVIPOLA municipality code (5 digits).
    pub municipality_code: String,
    pub municipality_name: String,
    /// DIVIPOLA department code (2 digits).
    pub department_code: String,
    pub department_name: String,
    pub line: String,
    pub postal_code: String,
}

/// Accounting contact declared by an acquirer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Issuer (OFE), acquirer or DS provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    /// Tax identifier, optionally carrying a check digit (`"900123456-7"`).
    pub nit: String,
    pub name: String,
    /// Tax-document type code (31 = NIT, 13 = cédula, ...).
    pub id_type: String,
    /// Juridical organisation code (1 = legal entity, 2 = natural person).
    pub organization_type: String,
    /// Fiscal responsibilities, e.g. `R-99-PN` or `O-13;O-15`.
    pub tax_level_code: String,
    pub tax_scheme_id: String,
    pub tax_scheme_name: String,
    pub address: Address,
    pub email: String,
    pub phone: String,
    /// Comma separated list of extra notification addresses.
    pub notification_emails: String,
    pub accounting_contact: Option<Contact>,
}

/// Tax applied to a single line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineTax {
    /// DIAN tax code (`01` IVA, `04` INC, `03` ICA, ...).
    pub tax_code: String,
    pub name: String,
    pub base: String,
    pub percent: String,
    pub amount: String,
}

/// One invoiced item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Line {
    pub sequence: u32,
    pub code: String,
    pub description: String,
    pub quantity: String,
    pub unit_code: String,
    pub unit_price: String,
    /// Line total before taxes.
    pub line_extension: String,
    pub taxes: Vec<LineTax>,
    /// Purchase date, only meaningful for support documents.
    pub purchase_date: Option<String>,
}

/// Document-level tax subtotal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tribute {
    pub tax_code: String,
    pub name: String,
    pub base: String,
    pub percent: String,
    pub amount: String,
}

/// Payment method declared on the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentMethod {
    /// Payment form (`1` cash, `2` credit); defaults to `1` on the wire.
    pub id: Option<String>,
    /// Payment means code (`10` cash, `42` bank deposit, ...).
    pub code: String,
    pub due_date: Option<String>,
}

/// Advance payment applied to the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepaidPayment {
    pub id: String,
    pub amount: String,
    pub received_date: String,
}

/// Reference to the original document corrected by a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentReference {
    pub prefix: String,
    pub number: String,
    pub cufe: Option<String>,
    pub issue_date: Option<String>,
}

impl DocumentReference {
    /// Full number of the referenced document.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}{}", self.prefix, self.number)
    }
}

/// Correction concept accompanying a note with reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConcept {
    pub code: String,
    pub observation: String,
}

/// Document money totals as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    /// Value without taxes.
    pub line_extension: String,
    pub tax_exclusive: String,
    pub tax_inclusive: String,
    /// Aggregate tax amount.
    pub taxes: String,
    /// Total payable, taxes included for FC/NC/ND.
    pub total: String,
    pub rounding: String,
    /// Advance payment (anticipo).
    pub prepaid: String,
}

/// Canonical internal document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub resolution: Resolution,
    pub prefix: String,
    pub consecutive: String,
    pub customization_id: Option<String>,
    pub invoice_type_code: Option<String>,
    /// `YYYY-MM-DD`.
    pub issue_date: String,
    /// `HH:MM:SS`, optionally with an offset.
    pub issue_time: String,
    pub due_date: Option<String>,
    pub currency: String,
    pub totals: Totals,
    /// The submitting company (OFE), for every kind.
    pub issuer: Party,
    /// The acquirer; for support documents, the provider being paid.
    pub customer: Party,
    pub reference: Option<DocumentReference>,
    pub correction: Option<CorrectionConcept>,
    pub lines: Vec<Line>,
    pub tributes: Vec<Tribute>,
    pub payment_means: Vec<PaymentMethod>,
    pub order_reference: Option<String>,
    pub notes: Vec<String>,
    pub prepaid_payments: Vec<PrepaidPayment>,
}

impl Document {
    /// Document number as known upstream: prefix followed by consecutive.
    #[must_use]
    pub fn number(&self) -> String {
        format!("{}{}", self.prefix, self.consecutive)
    }

    /// Currency code, `COP` when the document leaves it blank.
    #[must_use]
    pub fn currency_code(&self) -> &str {
        if self.currency.trim().is_empty() {
            "COP"
        } else {
            self.currency.trim()
        }
    }
}

/// Inbound batch; one list per document kind.
///
/// Only the first non-empty list (in FC, NC, ND, DS order) is dispatched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentBatch {
    #[serde(rename = "FC")]
    pub invoices: Vec<Document>,
    #[serde(rename = "NC")]
    pub credit_notes: Vec<Document>,
    #[serde(rename = "ND")]
    pub debit_notes: Vec<Document>,
    #[serde(rename = "DS")]
    pub support_documents: Vec<Document>,
}

impl DocumentBatch {
    /// Build a batch holding documents of a single kind.
    #[must_use]
    pub fn of(kind: DocumentKind, documents: Vec<Document>) -> Self {
        let mut batch = Self::default();
        match kind {
            DocumentKind::Invoice => batch.invoices = documents,
            DocumentKind::CreditNote => batch.credit_notes = documents,
            DocumentKind::DebitNote => batch.debit_notes = documents,
            DocumentKind::SupportDocument => batch.support_documents = documents,
        }
        batch
    }

    /// Pick the kind to dispatch and its documents.
    ///
    /// Returns `None` when every list is empty.
    #[must_use]
    pub fn into_selected(self) -> Option<(DocumentKind, Vec<Document>)> {
        [
            (DocumentKind::Invoice, self.invoices),
            (DocumentKind::CreditNote, self.credit_notes),
            (DocumentKind::DebitNote, self.debit_notes),
            (DocumentKind::SupportDocument, self.support_documents),
        ]
        .into_iter()
        .find(|(_, docs)| !docs.is_empty())
    }
}
