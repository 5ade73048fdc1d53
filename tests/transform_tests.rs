use std::sync::Arc;

use numrot_gateway::adapter::outbound::memory::InMemoryCustomers;
use numrot_gateway::adapter::outbound::numrot::{TransformSettings, Transformer};
use numrot_gateway::domain::{Document, DocumentKind};
use numrot_gateway::infrastructure::config::issuer::ResolutionConfig;
use numrot_gateway::infrastructure::config::numrot::Environment;
use numrot_gateway::port::{CustomerDirectory, CustomerRecord};
use numrot_gateway::testkit::document;
use serde_json::Value;

fn payload(transformer: &Transformer, kind: DocumentKind, doc: &Document) -> Value {
    let bytes = transformer.to_json(kind, doc).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn default_payload(kind: DocumentKind, doc: &Document) -> Value {
    payload(&Transformer::new(TransformSettings::default()), kind, doc)
}

#[test]
fn invoice_payload_carries_resolution_taxes_and_totals() {
    let json = default_payload(DocumentKind::Invoice, &document::invoice("SETT", "5604"));

    assert_eq!(json["ID"], "SETT5604");
    assert_eq!(json["CustomizationID"], "10");
    assert_eq!(json["InvoiceTypeCode"], "01");
    assert_eq!(json["ProfileExecutionID"], "2");
    assert_eq!(json["IssueTime"], "10:15:00-05:00");
    assert_eq!(json["LineCountNumeric"], "1");

    let control = &json["InvoiceControl"];
    assert_eq!(control["InvoiceAuthorization"], "18760000001");
    assert_eq!(control["AuthorizedInvoices"]["Prefix"], "SETT");
    assert_eq!(control["AuthorizedInvoices"]["To"], "99999");

    let tax = &json["TaxTotal"][0];
    assert_eq!(tax["TaxAmount"], "33529.00");
    assert_eq!(tax["TaxSubtotal"][0]["TaxCategory"]["Percent"], "19.00");
    assert_eq!(tax["TaxSubtotal"][0]["TaxCategory"]["TaxScheme"]["ID"], "01");

    let totals = &json["LegalMonetaryTotal"];
    assert_eq!(totals["LineExtensionAmount"], "176471.00");
    assert_eq!(totals["TaxExclusiveAmount"], "176471.00");
    assert_eq!(totals["TaxInclusiveAmount"], "210000.00");
    assert_eq!(totals["PrePaidAmount"], "0.00");
    assert_eq!(totals["PayableAmount"], "210000.00");

    let means = &json["PaymentMeans"][0];
    assert_eq!(means["ID"], "2");
    assert_eq!(means["PaymentMeansCode"], "42");

    let line = &json["InvoiceLine"][0];
    assert_eq!(line["ID"], "1");
    assert_eq!(line["UnitCode"], "94");
    assert_eq!(line["RoundingAmount"], "0.00");
    assert!(line.get("Note").is_none());
    assert_eq!(line["TaxTotal"][0]["TaxAmount"], "33529.00");
}

#[test]
fn invoice_parties_split_nit_and_check_digit() {
    let json = default_payload(DocumentKind::Invoice, &document::invoice("SETT", "1"));

    let supplier = &json["AccountingSupplierParty"]["Party"];
    assert_eq!(supplier["PartyTaxScheme"]["CompanyID"], "860011153");
    assert_eq!(supplier["PartyTaxScheme"]["SchemeID"], "6");
    assert_eq!(supplier["PartyLegalEntity"]["CorporateRegistrationScheme"]["ID"], "SETT");

    let customer = &json["AccountingCustomerParty"];
    assert_eq!(customer["AdditionalAccountID"], "1");
    assert_eq!(customer["Party"]["PartyTaxScheme"]["CompanyID"], "900123456");
    assert_eq!(customer["Party"]["PartyTaxScheme"]["SchemeID"], "7");
    assert_eq!(customer["Party"]["Contact"]["Telephone"], "6044440001");
    assert_eq!(
        customer["Party"]["Contact"]["ElectronicMail"],
        "conta@cliente.co;facturas@cliente.co"
    );
}

#[test]
fn credit_note_without_reference_or_taxes() {
    let json = default_payload(DocumentKind::CreditNote, &document::credit_note("77"));

    assert!(json.get("TaxTotal").is_none());
    assert_eq!(json["CustomizationID"], "22");
    assert_eq!(json["InvoiceTypeCode"], "91");
    assert!(json.get("DiscrepancyResponse").is_none());
    assert!(json.get("InvoiceDocumentReference").is_none());

    let totals = &json["LegalMonetaryTotal"];
    assert_eq!(totals["TaxExclusiveAmount"], "0.00");
    assert_eq!(totals["TaxInclusiveAmount"], "50000.00");
    assert_eq!(totals["PayableAmount"], "50000.00");

    let control = &json["InvoiceControl"];
    assert_eq!(control["InvoiceAuthorization"], "");
    assert_eq!(control["AuthorizationPeriod"]["StartDate"], "");
    assert_eq!(control["AuthorizationPeriod"]["EndDate"], "");
    assert_eq!(control["AuthorizedInvoices"]["Prefix"], "NC");
    assert_eq!(control["AuthorizedInvoices"]["From"], "");
    assert_eq!(control["AuthorizedInvoices"]["To"], "");
}

#[test]
fn credit_note_with_reference_carries_discrepancy_blocks() {
    let json = default_payload(
        DocumentKind::CreditNote,
        &document::credit_note_with_reference("78"),
    );

    assert_eq!(json["CustomizationID"], "20");
    let discrepancy = &json["DiscrepancyResponse"][0];
    assert_eq!(discrepancy["ReferenceID"], "SETT5604");
    assert_eq!(discrepancy["ResponseCode"], "2");

    let reference = &json["InvoiceDocumentReference"];
    assert_eq!(reference["ID"], "SETT5604");
    assert_eq!(reference["UUID"], "cufe-5604");
    assert_eq!(reference["IssueDate"], "2024-05-02");
}

#[test]
fn support_document_payload() {
    let json = default_payload(DocumentKind::SupportDocument, &document::support_document("9"));

    assert_eq!(json["InvoiceTypeCode"], "05");
    assert_eq!(json["CustomizationID"], "10");
    assert!(json.get("TaxTotal").is_none());

    let rate = &json["PaymentExchangeRate"];
    assert_eq!(rate["CalculationRate"], "1");
    assert_eq!(rate["SourceCurrencyCode"], "COP");
    assert_eq!(rate["Date"], "2024-04-28");

    let supplier = &json["AccountingSupplierParty"];
    assert_eq!(supplier["AdditionalAccountID"], "2");
    let location = &supplier["Party"]["PhysicalLocation"]["Address"];
    assert_eq!(location["ID"], "11001");
    assert_eq!(location["CityName"], "Bogotá, D.C.");
    assert_eq!(location["AddressLine"]["Line"], "Av. Carrera 45 No. 94 - 72");
    assert_eq!(supplier["Party"]["PartyTaxScheme"]["CompanyID"], "1020304050");
    assert_eq!(supplier["Party"]["PartyLegalEntity"]["CompanyID"], "1");

    let customer = &json["AccountingCustomerParty"]["Party"];
    assert_eq!(customer["PartyName"], "Positiva");
    assert_eq!(customer["PartyTaxScheme"]["CompanyID"], "860011153");
    assert!(customer.get("PhysicalLocation").is_none());

    let line = &json["InvoiceLine"][0];
    assert_eq!(line["Note"], serde_json::json!(["", ""]));
    assert!(line.get("TaxTotal").is_none());
    assert_eq!(line["InvoicePeriod"]["StartDate"], "2024-04-28");
    let standard = &line["Item"]["StandardItemIdentification"];
    assert_eq!(standard["SchemeID"], "999");
    assert_eq!(standard["SchemeName"], "Estándar de adopción del contribuyente");
}

#[test]
fn disabled_resolutions_use_the_configured_block() {
    let settings = TransformSettings {
        resolution: ResolutionConfig {
            disabled: true,
            authorization: "18764000009".into(),
            start_date: "2023-01-01".into(),
            end_date: "2025-12-31".into(),
            prefix: "FEPO".into(),
            from: "1000".into(),
            to: "5000".into(),
        },
        ..Default::default()
    };
    let json = payload(
        &Transformer::new(settings),
        DocumentKind::Invoice,
        &document::invoice("SETT", "1"),
    );

    let control = &json["InvoiceControl"];
    assert_eq!(control["InvoiceAuthorization"], "18764000009");
    assert_eq!(control["AuthorizedInvoices"]["Prefix"], "FEPO");
    assert_eq!(control["AuthorizationPeriod"]["EndDate"], "2025-12-31");
    assert_eq!(json["ID"], "SETT1");
}

#[test]
fn production_uses_production_profile() {
    let settings = TransformSettings {
        environment: Environment::Production,
        ..Default::default()
    };
    let mut doc = document::invoice("SETT", "1");
    doc.customer.nit = "900123456".into();
    let json = payload(&Transformer::new(settings), DocumentKind::Invoice, &doc);

    assert_eq!(json["ProfileExecutionID"], "1");
    assert_eq!(
        json["AccountingCustomerParty"]["Party"]["PartyTaxScheme"]["SchemeID"],
        "6"
    );
}

#[test]
fn directory_enriches_the_acquirer() {
    let customers = InMemoryCustomers::from_records([CustomerRecord {
        nit: "900123456".into(),
        id_type: "13".into(),
        organization_type: "2".into(),
        notification_emails: "tesoreria@cliente.co".into(),
    }])
    .unwrap();
    assert!(customers.find("900123456").is_some());

    let transformer = Transformer::new(TransformSettings::default())
        .with_customers(Arc::new(customers) as Arc<dyn CustomerDirectory>);
    let json = payload(&transformer, DocumentKind::Invoice, &document::invoice("SETT", "1"));

    let customer = &json["AccountingCustomerParty"];
    assert_eq!(customer["AdditionalAccountID"], "2");
    assert_eq!(customer["Party"]["PartyTaxScheme"]["SchemeName"], "13");
    assert_eq!(
        customer["Party"]["Contact"]["ElectronicMail"],
        "conta@cliente.co;facturas@cliente.co;tesoreria@cliente.co"
    );
}

#[test]
fn transform_is_deterministic() {
    let transformer = Transformer::new(TransformSettings::default());
    let doc = document::invoice("SETT", "42");
    assert_eq!(
        transformer.to_json(DocumentKind::Invoice, &doc).unwrap(),
        transformer.to_json(DocumentKind::Invoice, &doc).unwrap()
    );
}

#[test]
fn unparseable_amount_is_rejected() {
    let mut doc = document::invoice("SETT", "1");
    doc.lines[0].quantity = "uno".into();
    let err = Transformer::new(TransformSettings::default())
        .transform(DocumentKind::Invoice, &doc)
        .unwrap_err();
    assert!(err.to_string().contains("quantity"));
}
