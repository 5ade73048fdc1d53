//! Supplier and customer party blocks.
//!
//! For FC/NC/ND the supplier is the issuer and the customer the acquirer.
//! Support documents flip the roles: the provider being paid is the supplier
//! and the issuer appears as customer.

use super::TransformSettings;
use crate::adapter::outbound::numrot::dto::request::{
    AccountingParty, Address, AddressLine, Contact, Country, IdRef, Location, Party,
    PartyLegalEntity, PartyTaxScheme, TaxScheme,
};
use crate::domain::document::{self, DocumentKind};
use crate::domain::{Document, Nit};
use crate::infrastructure::config::issuer::FixedAddressConfig;
use crate::port::{CustomerDirectory, CustomerRecord};

/// `CompanyID` of the minimal legal entity sent for support-document providers.
pub const DS_LEGAL_ENTITY_ID: &str = "1";

const DEFAULT_ID_TYPE: &str = "31";
const DEFAULT_TAX_LEVEL: &str = "R-99-PN";
const LEGAL_ENTITY: &str = "1";
const NATURAL_PERSON: &str = "2";

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn wire_address(address: &document::Address) -> Address {
    Address {
        id: address.municipality_code.clone(),
        city_name: address.municipality_name.clone(),
        postal_zone: address.postal_code.clone(),
        country_subentity: address.department_name.clone(),
        country_subentity_code: address.department_code.clone(),
        address_line: AddressLine {
            line: address.line.clone(),
        },
        country: Country::colombia(),
    }
}

fn fixed_address(address: &FixedAddressConfig) -> Address {
    Address {
        id: address.municipality_code.clone(),
        city_name: address.municipality_name.clone(),
        postal_zone: address.postal_code.clone(),
        country_subentity: address.department_name.clone(),
        country_subentity_code: address.department_code.clone(),
        address_line: AddressLine {
            line: address.line.clone(),
        },
        country: Country::colombia(),
    }
}

fn party_scheme(party: &document::Party) -> TaxScheme {
    TaxScheme::new(
        or_default(&party.tax_scheme_id, "01"),
        or_default(&party.tax_scheme_name, "IVA"),
    )
}

/// `AccountingSupplierParty`.
pub fn supplier(
    kind: DocumentKind,
    document: &Document,
    issuer_nit: &Nit,
    settings: &TransformSettings,
) -> AccountingParty {
    if kind == DocumentKind::SupportDocument {
        return support_document_supplier(document, settings);
    }

    let issuer = &document.issuer;
    let name = or_default(&issuer.name, &settings.issuer.name).to_string();
    let dv = issuer_nit.dv_or(settings.environment.fallback_dv()).to_string();
    let address = wire_address(&issuer.address);

    AccountingParty {
        additional_account_id: or_default(&issuer.organization_type, LEGAL_ENTITY).to_string(),
        party: Party {
            party_name: name.clone(),
            physical_location: Some(Location {
                address: address.clone(),
            }),
            party_tax_scheme: PartyTaxScheme {
                registration_name: name.clone(),
                company_id: issuer_nit.base().to_string(),
                scheme_id: dv.clone(),
                scheme_name: or_default(&issuer.id_type, DEFAULT_ID_TYPE).to_string(),
                tax_level_code: or_default(&issuer.tax_level_code, DEFAULT_TAX_LEVEL).to_string(),
                registration_address: Some(address),
                tax_scheme: party_scheme(issuer),
            },
            party_legal_entity: Some(PartyLegalEntity {
                registration_name: name,
                company_id: issuer_nit.base().to_string(),
                scheme_id: dv,
                corporate_registration_scheme: Some(IdRef {
                    id: document.prefix.clone(),
                }),
            }),
            contact: Some(Contact {
                name: String::new(),
                telephone: issuer.phone.clone(),
                electronic_mail: settings.issuer.notification_email.clone(),
            }),
        },
    }
}

fn support_document_supplier(document: &Document, settings: &TransformSettings) -> AccountingParty {
    let provider = &document.customer;
    let nit = Nit::parse(&provider.nit);
    let address = fixed_address(&settings.issuer.supplier_address);

    let contact = (!provider.email.trim().is_empty() || !provider.phone.trim().is_empty()).then(|| {
        Contact {
            name: provider.name.clone(),
            telephone: provider.phone.clone(),
            electronic_mail: provider.email.trim().to_string(),
        }
    });

    AccountingParty {
        additional_account_id: or_default(&provider.organization_type, NATURAL_PERSON).to_string(),
        party: Party {
            party_name: provider.name.clone(),
            physical_location: Some(Location {
                address: address.clone(),
            }),
            party_tax_scheme: PartyTaxScheme {
                registration_name: provider.name.clone(),
                company_id: nit.base().to_string(),
                scheme_id: String::new(),
                scheme_name: or_default(&provider.id_type, "13").to_string(),
                tax_level_code: or_default(&provider.tax_level_code, DEFAULT_TAX_LEVEL).to_string(),
                registration_address: Some(address),
                tax_scheme: TaxScheme::new(
                    or_default(&provider.tax_scheme_id, "ZZ"),
                    or_default(&provider.tax_scheme_name, "No aplica"),
                ),
            },
            party_legal_entity: Some(PartyLegalEntity {
                registration_name: String::new(),
                company_id: DS_LEGAL_ENTITY_ID.to_string(),
                scheme_id: String::new(),
                corporate_registration_scheme: None,
            }),
            contact,
        },
    }
}

/// `AccountingCustomerParty`.
pub fn customer(
    kind: DocumentKind,
    document: &Document,
    issuer_nit: &Nit,
    settings: &TransformSettings,
    directory: Option<&dyn CustomerDirectory>,
) -> AccountingParty {
    if kind == DocumentKind::SupportDocument {
        return support_document_customer(document, issuer_nit, settings);
    }

    let acquirer = &document.customer;
    let nit = Nit::parse(&acquirer.nit);
    let record = directory.and_then(|dir| dir.find(nit.base()));
    let record = record.as_ref();

    let id_type = record
        .map(|r| r.id_type.as_str())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| or_default(&acquirer.id_type, DEFAULT_ID_TYPE));
    let organization_type = record
        .map(|r| r.organization_type.as_str())
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| or_default(&acquirer.organization_type, LEGAL_ENTITY));
    let dv = nit.dv_or(settings.environment.fallback_dv()).to_string();
    let address = wire_address(&acquirer.address);

    AccountingParty {
        additional_account_id: organization_type.trim().to_string(),
        party: Party {
            party_name: acquirer.name.clone(),
            physical_location: Some(Location {
                address: address.clone(),
            }),
            party_tax_scheme: PartyTaxScheme {
                registration_name: acquirer.name.clone(),
                company_id: nit.base().to_string(),
                scheme_id: dv.clone(),
                scheme_name: id_type.trim().to_string(),
                tax_level_code: or_default(&acquirer.tax_level_code, DEFAULT_TAX_LEVEL).to_string(),
                registration_address: Some(address),
                tax_scheme: party_scheme(acquirer),
            },
            party_legal_entity: Some(PartyLegalEntity {
                registration_name: acquirer.name.clone(),
                company_id: nit.base().to_string(),
                scheme_id: dv,
                corporate_registration_scheme: None,
            }),
            contact: acquirer_contact(acquirer, record),
        },
    }
}

fn support_document_customer(
    document: &Document,
    issuer_nit: &Nit,
    settings: &TransformSettings,
) -> AccountingParty {
    let issuer = &document.issuer;
    let name = settings.issuer.name.clone();
    AccountingParty {
        additional_account_id: or_default(&issuer.organization_type, LEGAL_ENTITY).to_string(),
        party: Party {
            party_name: name.clone(),
            physical_location: None,
            party_tax_scheme: PartyTaxScheme {
                registration_name: name,
                company_id: issuer_nit.base().to_string(),
                scheme_id: issuer_nit.dv_or(settings.environment.fallback_dv()).to_string(),
                scheme_name: or_default(&issuer.id_type, DEFAULT_ID_TYPE).to_string(),
                tax_level_code: or_default(&issuer.tax_level_code, DEFAULT_TAX_LEVEL).to_string(),
                registration_address: None,
                tax_scheme: TaxScheme::new("ZZ", "No aplica"),
            },
            party_legal_entity: None,
            contact: None,
        },
    }
}

/// Contact block, present only when a telephone is known.
fn acquirer_contact(acquirer: &document::Party, record: Option<&CustomerRecord>) -> Option<Contact> {
    let accounting = acquirer.accounting_contact.as_ref();
    let telephone = accounting
        .map(|c| c.phone.trim())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| acquirer.phone.trim());
    if telephone.is_empty() {
        return None;
    }

    Some(Contact {
        name: accounting.map(|c| c.name.clone()).unwrap_or_default(),
        telephone: telephone.to_string(),
        electronic_mail: merge_emails(acquirer, record),
    })
}

/// Accounting contact, primary and notification addresses; trimmed,
/// deduplicated, `;` separated.
pub fn merge_emails(acquirer: &document::Party, record: Option<&CustomerRecord>) -> String {
    let accounting = acquirer
        .accounting_contact
        .as_ref()
        .map(|c| c.email.as_str());
    let listed = acquirer
        .notification_emails
        .split(',')
        .chain(record.into_iter().flat_map(|r| r.notification_emails.split(',')));

    let mut merged: Vec<&str> = Vec::new();
    for email in accounting
        .into_iter()
        .chain(std::iter::once(acquirer.email.as_str()))
        .chain(listed)
        .map(str::trim)
    {
        if !email.is_empty() && !merged.iter().any(|m| m.eq_ignore_ascii_case(email)) {
            merged.push(email);
        }
    }
    merged.join(";")
}
