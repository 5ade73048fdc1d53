//! Submission payload as the upstream expects it.
//!
//! Field names are case-sensitive on the wire; most follow `PascalCase`, the
//! UBL acronyms (`ID`, `UUID`, `CustomizationID`, ...) are renamed explicitly.

use serde::Serialize;

/// One document submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentPayload {
    pub invoice_control: InvoiceControl,
    #[serde(rename = "CustomizationID")]
    pub customization_id: String,
    #[serde(rename = "ProfileExecutionID")]
    pub profile_execution_id: String,
    #[serde(rename = "ID")]
    pub id: String,
    pub issue_date: String,
    pub issue_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub invoice_type_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<String>,
    pub document_currency_code: String,
    pub line_count_numeric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<IdRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discrepancy_response: Vec<DiscrepancyResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_document_reference: Option<InvoiceDocumentReference>,
    pub accounting_supplier_party: AccountingParty,
    pub accounting_customer_party: AccountingParty,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_means: Vec<PaymentMeans>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_paid_payment: Vec<PrePaidPayment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_exchange_rate: Option<PaymentExchangeRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_period: Option<InvoicePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tax_total: Vec<TaxTotal>,
    pub legal_monetary_total: LegalMonetaryTotal,
    pub invoice_line: Vec<InvoiceLine>,
}

/// Resolution block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceControl {
    pub invoice_authorization: String,
    pub authorization_period: AuthorizationPeriod,
    pub authorized_invoices: AuthorizedInvoices,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizationPeriod {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizedInvoices {
    pub prefix: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRef {
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiscrepancyResponse {
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
    pub response_code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceDocumentReference {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "UUID", skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
}

/// Supplier or customer wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountingParty {
    /// Juridical organisation code.
    #[serde(rename = "AdditionalAccountID")]
    pub additional_account_id: String,
    pub party: Party,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Party {
    pub party_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_location: Option<Location>,
    pub party_tax_scheme: PartyTaxScheme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party_legal_entity: Option<PartyLegalEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    /// DIVIPOLA municipality code.
    #[serde(rename = "ID")]
    pub id: String,
    pub city_name: String,
    pub postal_zone: String,
    pub country_subentity: String,
    pub country_subentity_code: String,
    pub address_line: AddressLine,
    pub country: Country,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressLine {
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Country {
    pub identification_code: String,
    pub name: String,
}

impl Country {
    #[must_use]
    pub fn colombia() -> Self {
        Self {
            identification_code: "CO".into(),
            name: "Colombia".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartyTaxScheme {
    pub registration_name: String,
    /// NIT without check digit.
    #[serde(rename = "CompanyID")]
    pub company_id: String,
    /// Check digit.
    #[serde(rename = "SchemeID")]
    pub scheme_id: String,
    /// Tax-document type code.
    pub scheme_name: String,
    pub tax_level_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_address: Option<Address>,
    pub tax_scheme: TaxScheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxScheme {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
}

impl TaxScheme {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartyLegalEntity {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub registration_name: String,
    #[serde(rename = "CompanyID")]
    pub company_id: String,
    #[serde(rename = "SchemeID", skip_serializing_if = "String::is_empty")]
    pub scheme_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporate_registration_scheme: Option<IdRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contact {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub telephone: String,
    /// Semicolon separated addresses.
    pub electronic_mail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentMeans {
    #[serde(rename = "ID")]
    pub id: String,
    pub payment_means_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrePaidPayment {
    #[serde(rename = "ID")]
    pub id: String,
    pub paid_amount: String,
    pub received_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentExchangeRate {
    pub source_currency_code: String,
    pub source_currency_base_rate: String,
    pub target_currency_code: String,
    pub target_currency_base_rate: String,
    pub calculation_rate: String,
    pub date: String,
}

/// Period covered by the document or by a line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoicePeriod {
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Taxes of one tax code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxTotal {
    pub tax_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounding_amount: Option<String>,
    pub tax_subtotal: Vec<TaxSubtotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxSubtotal {
    pub taxable_amount: String,
    pub tax_amount: String,
    pub tax_category: TaxCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaxCategory {
    pub percent: String,
    pub tax_scheme: TaxScheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegalMonetaryTotal {
    pub line_extension_amount: String,
    pub tax_exclusive_amount: String,
    pub tax_inclusive_amount: String,
    pub pre_paid_amount: String,
    pub payable_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceLine {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Vec<String>>,
    pub invoiced_quantity: String,
    pub unit_code: String,
    pub line_extension_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_period: Option<InvoicePeriod>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tax_total: Vec<TaxTotal>,
    pub rounding_amount: String,
    pub item: Item,
    pub price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sellers_item_identification: Option<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_item_identification: Option<StandardItemIdentification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StandardItemIdentification {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "SchemeID")]
    pub scheme_id: String,
    pub scheme_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Price {
    pub price_amount: String,
    pub base_quantity: String,
}
