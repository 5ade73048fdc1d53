//! Internal document to upstream payload.
//!
//! [`Transformer::transform`] is pure: same document and settings, same
//! payload. The only collaborator is an optional [`CustomerDirectory`] used
//! to enrich acquirer data.

pub mod lines;
pub mod parties;
pub mod taxes;
pub mod units;

use std::sync::Arc;

use super::dto::request::{
    AuthorizationPeriod, AuthorizedInvoices, DiscrepancyResponse, DocumentPayload, IdRef,
    InvoiceControl, InvoiceDocumentReference, InvoicePeriod, LegalMonetaryTotal,
    PaymentExchangeRate, PaymentMeans, PrePaidPayment,
};
use crate::domain::{money, Document, DocumentKind, Nit};
use crate::error::TransformError;
use crate::infrastructure::config::issuer::{CreditNotePeriodConfig, IssuerConfig, ResolutionConfig};
use crate::infrastructure::config::numrot::Environment;
use crate::infrastructure::config::Config;
use crate::port::CustomerDirectory;

/// Customization of notes that reference the corrected document.
const CUSTOMIZATIONS_WITH_REFERENCE: [&str; 2] = ["20", "30"];
/// Customization of credit notes without reference.
const CREDIT_NOTE_WITHOUT_REFERENCE: &str = "22";

/// Configuration the transformer reads.
#[derive(Debug, Clone, Default)]
pub struct TransformSettings {
    pub environment: Environment,
    pub issuer: IssuerConfig,
    pub resolution: ResolutionConfig,
    pub credit_note_period: CreditNotePeriodConfig,
}

impl TransformSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            environment: config.numrot.environment,
            issuer: config.issuer.clone(),
            resolution: config.resolution.clone(),
            credit_note_period: config.credit_note_period.clone(),
        }
    }
}

/// Builds upstream payloads.
#[derive(Clone, Default)]
pub struct Transformer {
    settings: TransformSettings,
    customers: Option<Arc<dyn CustomerDirectory>>,
}

impl Transformer {
    #[must_use]
    pub fn new(settings: TransformSettings) -> Self {
        Self {
            settings,
            customers: None,
        }
    }

    /// Enrich acquirers from `customers`.
    #[must_use]
    pub fn with_customers(mut self, customers: Arc<dyn CustomerDirectory>) -> Self {
        self.customers = Some(customers);
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// Build the payload for `document` of `kind`.
    ///
    /// # Errors
    ///
    /// [`TransformError::MissingIssuerNit`] when the issuer has no NIT and
    /// [`TransformError::InvalidAmount`] for amounts that do not parse.
    pub fn transform(
        &self,
        kind: DocumentKind,
        document: &Document,
    ) -> Result<DocumentPayload, TransformError> {
        let issuer_nit = Nit::parse(&document.issuer.nit);
        if issuer_nit.is_empty() {
            return Err(TransformError::MissingIssuerNit);
        }

        let settings = &self.settings;
        let support = kind == DocumentKind::SupportDocument;
        let customization = customization_id(kind, document);

        let invoice_type_code = if support {
            kind.default_invoice_type_code().to_string()
        } else {
            non_blank(document.invoice_type_code.as_deref())
                .unwrap_or(kind.default_invoice_type_code())
                .to_string()
        };

        let (discrepancy_response, invoice_document_reference) =
            reference_blocks(&customization, document);

        let tax_total = if support {
            Vec::new()
        } else {
            taxes::document_totals(document)?
        };
        let legal_monetary_total = monetary_total(kind, document, !tax_total.is_empty());

        Ok(DocumentPayload {
            invoice_control: self.invoice_control(kind, document),
            profile_execution_id: settings.environment.profile_execution_id().to_string(),
            id: document.number(),
            issue_date: document.issue_date.trim().to_string(),
            issue_time: with_offset(&document.issue_time, &settings.issuer.utc_offset),
            due_date: non_blank(document.due_date.as_deref()).map(str::to_string),
            invoice_type_code,
            note: document.notes.clone(),
            document_currency_code: document.currency_code().to_string(),
            line_count_numeric: document.lines.len().to_string(),
            order_reference: non_blank(document.order_reference.as_deref())
                .map(|id| IdRef { id: id.to_string() }),
            discrepancy_response,
            invoice_document_reference,
            accounting_supplier_party: parties::supplier(kind, document, &issuer_nit, settings),
            accounting_customer_party: parties::customer(
                kind,
                document,
                &issuer_nit,
                settings,
                self.customers.as_deref(),
            ),
            payment_means: payment_means(document),
            pre_paid_payment: prepaid_payments(document),
            payment_exchange_rate: support.then(|| exchange_rate(document)),
            invoice_period: self.credit_note_period(&customization),
            tax_total,
            legal_monetary_total,
            invoice_line: lines::build(kind, &document.lines)?,
            customization_id: customization,
        })
    }

    /// Serialize the payload for `document` to JSON bytes.
    ///
    /// # Errors
    ///
    /// As [`Self::transform`], plus [`TransformError::Encode`].
    pub fn to_json(&self, kind: DocumentKind, document: &Document) -> Result<Vec<u8>, TransformError> {
        let payload = self.transform(kind, document)?;
        serde_json::to_vec(&payload).map_err(|e| TransformError::Encode(e.to_string()))
    }

    fn invoice_control(&self, kind: DocumentKind, document: &Document) -> InvoiceControl {
        if kind.is_note() {
            let prefix = non_blank(Some(document.prefix.as_str())).unwrap_or(kind.code());
            return InvoiceControl {
                authorized_invoices: AuthorizedInvoices {
                    prefix: prefix.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            };
        }

        let fallback = &self.settings.resolution;
        if fallback.disabled {
            return InvoiceControl {
                invoice_authorization: fallback.authorization.clone(),
                authorization_period: AuthorizationPeriod {
                    start_date: fallback.start_date.clone(),
                    end_date: fallback.end_date.clone(),
                },
                authorized_invoices: AuthorizedInvoices {
                    prefix: fallback.prefix.clone(),
                    from: fallback.from.clone(),
                    to: fallback.to.clone(),
                },
            };
        }

        let resolution = &document.resolution;
        InvoiceControl {
            invoice_authorization: resolution.authorization.clone(),
            authorization_period: AuthorizationPeriod {
                start_date: resolution.start_date.clone(),
                end_date: resolution.end_date.clone(),
            },
            authorized_invoices: AuthorizedInvoices {
                prefix: resolution.prefix.clone(),
                from: resolution.from.clone(),
                to: resolution.to.clone(),
            },
        }
    }

    fn credit_note_period(&self, customization: &str) -> Option<InvoicePeriod> {
        let period = &self.settings.credit_note_period;
        if customization != CREDIT_NOTE_WITHOUT_REFERENCE || !period.is_complete() {
            return None;
        }
        Some(InvoicePeriod {
            start_date: period.start_date.trim().to_string(),
            start_time: non_blank(Some(period.start_time.as_str())).map(str::to_string),
            end_date: Some(period.end_date.trim().to_string()),
            end_time: non_blank(Some(period.end_time.as_str())).map(str::to_string),
            ..Default::default()
        })
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("settings", &self.settings)
            .field("customers", &self.customers.is_some())
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn customization_id(kind: DocumentKind, document: &Document) -> String {
    non_blank(document.customization_id.as_deref())
        .unwrap_or(kind.default_customization())
        .to_string()
}

/// Append `offset` unless `time` already carries one.
fn with_offset(time: &str, offset: &str) -> String {
    let time = time.trim();
    let has_offset = time.ends_with('Z') || time.get(8..).is_some_and(|tail| tail.contains(['+', '-']));
    if time.is_empty() || has_offset {
        time.to_string()
    } else {
        format!("{time}{}", offset.trim())
    }
}

fn reference_blocks(
    customization: &str,
    document: &Document,
) -> (Vec<DiscrepancyResponse>, Option<InvoiceDocumentReference>) {
    if !CUSTOMIZATIONS_WITH_REFERENCE.contains(&customization) {
        return (Vec::new(), None);
    }
    let (Some(reference), Some(correction)) = (&document.reference, &document.correction) else {
        return (Vec::new(), None);
    };
    if reference.number.trim().is_empty() || correction.code.trim().is_empty() {
        return (Vec::new(), None);
    }

    let id = reference.id();
    (
        vec![DiscrepancyResponse {
            reference_id: id.clone(),
            response_code: correction.code.trim().to_string(),
            description: correction.observation.clone(),
        }],
        Some(InvoiceDocumentReference {
            id,
            uuid: non_blank(reference.cufe.as_deref()).map(str::to_string),
            issue_date: non_blank(reference.issue_date.as_deref()).map(str::to_string),
        }),
    )
}

fn payment_means(document: &Document) -> Vec<PaymentMeans> {
    document
        .payment_means
        .iter()
        .map(|method| PaymentMeans {
            id: non_blank(method.id.as_deref()).unwrap_or("1").to_string(),
            payment_means_code: method.code.trim().to_string(),
            payment_due_date: non_blank(method.due_date.as_deref()).map(str::to_string),
        })
        .collect()
}

fn prepaid_payments(document: &Document) -> Vec<PrePaidPayment> {
    let anticipo = &document.totals.prepaid;
    if !money::is_positive(anticipo) {
        return Vec::new();
    }
    if document.prepaid_payments.is_empty() {
        return vec![PrePaidPayment {
            id: "1".into(),
            paid_amount: money::normalize(anticipo),
            received_date: document.issue_date.trim().to_string(),
        }];
    }
    document
        .prepaid_payments
        .iter()
        .enumerate()
        .map(|(index, payment)| PrePaidPayment {
            id: non_blank(Some(payment.id.as_str()))
                .map_or_else(|| (index + 1).to_string(), str::to_string),
            paid_amount: money::normalize(&payment.amount),
            received_date: non_blank(Some(payment.received_date.as_str()))
                .unwrap_or(document.issue_date.trim())
                .to_string(),
        })
        .collect()
}

fn exchange_rate(document: &Document) -> PaymentExchangeRate {
    let currency = document.currency_code().to_string();
    let date = document
        .lines
        .first()
        .and_then(|line| non_blank(line.purchase_date.as_deref()))
        .unwrap_or(document.issue_date.trim())
        .to_string();
    PaymentExchangeRate {
        source_currency_code: currency.clone(),
        source_currency_base_rate: "1.00".into(),
        target_currency_code: currency,
        target_currency_base_rate: "1.00".into(),
        calculation_rate: "1".into(),
        date,
    }
}

fn monetary_total(kind: DocumentKind, document: &Document, has_taxes: bool) -> LegalMonetaryTotal {
    let totals = &document.totals;
    let line_extension = totals.line_extension.trim().to_string();
    let support = kind == DocumentKind::SupportDocument;

    let tax_exclusive = if support || !has_taxes {
        money::ZERO.to_string()
    } else {
        line_extension.clone()
    };
    let prepaid = if support {
        totals.prepaid.clone()
    } else {
        match totals.prepaid.trim() {
            "" | "0" | "0.00" => money::ZERO.to_string(),
            other => other.to_string(),
        }
    };

    LegalMonetaryTotal {
        line_extension_amount: line_extension,
        tax_exclusive_amount: tax_exclusive,
        tax_inclusive_amount: totals.total.trim().to_string(),
        pre_paid_amount: prepaid,
        payable_amount: totals.total.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_appended_once() {
        assert_eq!(with_offset("10:15:00", "-05:00"), "10:15:00-05:00");
        assert_eq!(with_offset("10:15:00-05:00", "-05:00"), "10:15:00-05:00");
        assert_eq!(with_offset("10:15:00+01:00", "-05:00"), "10:15:00+01:00");
        assert_eq!(with_offset("10:15:00Z", "-05:00"), "10:15:00Z");
        assert_eq!(with_offset("", "-05:00"), "");
    }

    #[test]
    fn prepaid_amount_normalization() {
        let mut doc = Document::default();
        for raw in ["", "0", "0.00"] {
            doc.totals.prepaid = raw.into();
            assert_eq!(
                monetary_total(DocumentKind::Invoice, &doc, false).pre_paid_amount,
                "0.00"
            );
        }
        doc.totals.prepaid = String::new();
        assert_eq!(
            monetary_total(DocumentKind::SupportDocument, &doc, false).pre_paid_amount,
            ""
        );
    }

    #[test]
    fn prepaid_payment_synthesized_from_anticipo() {
        let doc = Document {
            issue_date: "2024-05-01".into(),
            totals: crate::domain::document::Totals {
                prepaid: "1000".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let payments = prepaid_payments(&doc);
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].paid_amount, "1000.00");
        assert_eq!(payments[0].received_date, "2024-05-01");

        let none = Document::default();
        assert!(prepaid_payments(&none).is_empty());
    }

    #[test]
    fn missing_issuer_nit_is_rejected() {
        let transformer = Transformer::default();
        assert_eq!(
            transformer
                .transform(DocumentKind::Invoice, &Document::default())
                .unwrap_err(),
            TransformError::MissingIssuerNit
        );
    }
}
