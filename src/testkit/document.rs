//! Builders for canonical documents.
//!
//! Values are realistic but fixed, so assertions can name them directly.

use crate::domain::document::{
    Address, Contact, CorrectionConcept, DocumentReference, Line, LineTax, PaymentMethod,
    Party, Resolution, Totals, Tribute,
};
use crate::domain::{Document, DocumentBatch, DocumentKind};

pub const ISSUER_NIT: &str = "860011153-6";
pub const ACQUIRER_NIT: &str = "900123456-7";
pub const PROVIDER_NIT: &str = "1020304050";

pub fn address() -> Address {
    Address {
        municipality_code: "05001".into(),
        municipality_name: "Medellín".into(),
        department_code: "05".into(),
        department_name: "Antioquia".into(),
        line: "Calle 10 # 43-12".into(),
        postal_code: "050021".into(),
    }
}

/// The submitting company.
pub fn issuer() -> Party {
    Party {
        nit: ISSUER_NIT.into(),
        name: "Positiva Compañía de Seguros".into(),
        id_type: "31".into(),
        organization_type: "1".into(),
        tax_level_code: "O-13;O-15".into(),
        tax_scheme_id: "01".into(),
        tax_scheme_name: "IVA".into(),
        address: Address {
            municipality_code: "11001".into(),
            municipality_name: "Bogotá, D.C.".into(),
            department_code: "11".into(),
            department_name: "Bogotá".into(),
            line: "Av. Carrera 45 No. 94 - 72".into(),
            postal_code: "110221".into(),
        },
        phone: "6013307000".into(),
        ..Default::default()
    }
}

pub fn acquirer() -> Party {
    Party {
        nit: ACQUIRER_NIT.into(),
        name: "Cliente Ejemplo SAS".into(),
        id_type: "31".into(),
        organization_type: "1".into(),
        tax_level_code: "R-99-PN".into(),
        tax_scheme_id: "01".into(),
        tax_scheme_name: "IVA".into(),
        address: address(),
        email: "facturas@cliente.co".into(),
        phone: "6044440000".into(),
        accounting_contact: Some(Contact {
            name: "Contabilidad".into(),
            email: "conta@cliente.co".into(),
            phone: "6044440001".into(),
        }),
        ..Default::default()
    }
}

/// A natural person selling to the issuer (support documents).
pub fn provider() -> Party {
    Party {
        nit: PROVIDER_NIT.into(),
        name: "Proveedor Persona Natural".into(),
        id_type: "13".into(),
        organization_type: "2".into(),
        address: address(),
        email: "proveedor@correo.co".into(),
        phone: "3001234567".into(),
        ..Default::default()
    }
}

pub fn resolution(prefix: &str) -> Resolution {
    Resolution {
        authorization: "18760000001".into(),
        start_date: "2024-01-01".into(),
        end_date: "2026-12-31".into(),
        prefix: prefix.into(),
        from: "1".into(),
        to: "99999".into(),
    }
}

/// One taxed line: 176471.00 plus 19% IVA.
pub fn taxed_line() -> Line {
    Line {
        sequence: 1,
        code: "SRV-01".into(),
        description: "Servicio de consultoría".into(),
        quantity: "1".into(),
        unit_code: "UN".into(),
        unit_price: "176471.00".into(),
        line_extension: "176471.00".into(),
        taxes: vec![LineTax {
            tax_code: "01".into(),
            name: "IVA".into(),
            base: "176471.00".into(),
            percent: "19.00".into(),
            amount: "33529.00".into(),
        }],
        purchase_date: None,
    }
}

pub fn untaxed_line(amount: &str) -> Line {
    Line {
        sequence: 1,
        code: "SRV-02".into(),
        description: "Ajuste".into(),
        quantity: "1".into(),
        unit_code: "UN".into(),
        unit_price: amount.into(),
        line_extension: amount.into(),
        taxes: Vec::new(),
        purchase_date: None,
    }
}

/// Invoice totalling 210000.00 (176471.00 + 33529.00 IVA).
pub fn invoice(prefix: &str, consecutive: &str) -> Document {
    Document {
        resolution: resolution(prefix),
        prefix: prefix.into(),
        consecutive: consecutive.into(),
        issue_date: "2024-05-02".into(),
        issue_time: "10:15:00".into(),
        due_date: Some("2024-06-01".into()),
        currency: "COP".into(),
        totals: Totals {
            line_extension: "176471.00".into(),
            tax_exclusive: "176471.00".into(),
            tax_inclusive: "210000.00".into(),
            taxes: "33529.00".into(),
            total: "210000.00".into(),
            rounding: "0.00".into(),
            prepaid: "0.00".into(),
        },
        issuer: issuer(),
        customer: acquirer(),
        lines: vec![taxed_line()],
        tributes: vec![Tribute {
            tax_code: "01".into(),
            name: "IVA".into(),
            base: "176471.00".into(),
            percent: "19.00".into(),
            amount: "33529.00".into(),
        }],
        payment_means: vec![PaymentMethod {
            id: Some("2".into()),
            code: "42".into(),
            due_date: Some("2024-06-01".into()),
        }],
        ..Default::default()
    }
}

/// `count` invoices numbered from `first`.
pub fn invoices(prefix: &str, first: u32, count: u32) -> Vec<Document> {
    (first..first + count)
        .map(|n| invoice(prefix, &n.to_string()))
        .collect()
}

/// Credit note without reference and without IVA, totalling 50000.00.
pub fn credit_note(consecutive: &str) -> Document {
    Document {
        prefix: "NC".into(),
        consecutive: consecutive.into(),
        customization_id: Some("22".into()),
        issue_date: "2024-05-03".into(),
        issue_time: "08:00:00".into(),
        currency: "COP".into(),
        totals: Totals {
            line_extension: "50000.00".into(),
            tax_exclusive: "0.00".into(),
            tax_inclusive: "50000.00".into(),
            taxes: "0.00".into(),
            total: "50000.00".into(),
            ..Default::default()
        },
        issuer: issuer(),
        customer: acquirer(),
        lines: vec![untaxed_line("50000.00")],
        ..Default::default()
    }
}

/// Credit note correcting `SETT5604`.
pub fn credit_note_with_reference(consecutive: &str) -> Document {
    Document {
        customization_id: Some("20".into()),
        reference: Some(DocumentReference {
            prefix: "SETT".into(),
            number: "5604".into(),
            cufe: Some("cufe-5604".into()),
            issue_date: Some("2024-05-02".into()),
        }),
        correction: Some(CorrectionConcept {
            code: "2".into(),
            observation: "Anulación parcial".into(),
        }),
        ..credit_note(consecutive)
    }
}

/// Support document paying [`provider`] 80000.00, untaxed.
pub fn support_document(consecutive: &str) -> Document {
    let mut line = untaxed_line("80000.00");
    line.purchase_date = Some("2024-04-28".into());
    Document {
        resolution: resolution("DS"),
        prefix: "DS".into(),
        consecutive: consecutive.into(),
        issue_date: "2024-05-04".into(),
        issue_time: "09:30:00".into(),
        currency: "COP".into(),
        totals: Totals {
            line_extension: "80000.00".into(),
            tax_inclusive: "80000.00".into(),
            taxes: "0.00".into(),
            total: "80000.00".into(),
            ..Default::default()
        },
        issuer: issuer(),
        customer: provider(),
        lines: vec![line],
        payment_means: vec![PaymentMethod {
            id: Some("1".into()),
            code: "10".into(),
            due_date: None,
        }],
        ..Default::default()
    }
}

pub fn batch(kind: DocumentKind, documents: Vec<Document>) -> DocumentBatch {
    DocumentBatch::of(kind, documents)
}
