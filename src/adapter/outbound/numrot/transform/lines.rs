//! Invoice lines.

use super::taxes;
use super::units::map_unit_code;
use crate::adapter::outbound::numrot::dto::request::{
    IdRef, InvoiceLine, InvoicePeriod, Item, Price, StandardItemIdentification,
};
use crate::domain::document::{DocumentKind, Line};
use crate::domain::money;
use crate::error::TransformError;

/// Identification scheme for items on support documents.
pub const DS_ITEM_SCHEME_ID: &str = "999";
pub const DS_ITEM_SCHEME_NAME: &str = "Estándar de adopción del contribuyente";

/// Build the wire lines, numbered from 1.
pub fn build(kind: DocumentKind, lines: &[Line]) -> Result<Vec<InvoiceLine>, TransformError> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| build_line(kind, index + 1, line))
        .collect()
}

fn build_line(kind: DocumentKind, id: usize, line: &Line) -> Result<InvoiceLine, TransformError> {
    let support = kind == DocumentKind::SupportDocument;

    let tax_total = if support {
        Vec::new()
    } else {
        taxes::line_totals(line)?
    };

    let invoice_period = if support {
        line.purchase_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|date| InvoicePeriod {
                start_date: date.to_string(),
                description_code: Some("1".into()),
                description: Some("Por operación".into()),
                ..Default::default()
            })
    } else {
        None
    };

    let code = line.code.trim().to_string();
    let item = if support {
        Item {
            description: line.description.clone(),
            sellers_item_identification: None,
            standard_item_identification: Some(StandardItemIdentification {
                id: code,
                scheme_id: DS_ITEM_SCHEME_ID.into(),
                scheme_name: DS_ITEM_SCHEME_NAME.into(),
            }),
        }
    } else {
        Item {
            description: line.description.clone(),
            sellers_item_identification: (!code.is_empty()).then_some(IdRef { id: code }),
            standard_item_identification: None,
        }
    };

    let quantity = taxes::amount("quantity", &line.quantity)?;
    Ok(InvoiceLine {
        id: id.to_string(),
        note: support.then(|| vec![String::new(), String::new()]),
        invoiced_quantity: money::format_quantity(quantity),
        unit_code: map_unit_code(&line.unit_code),
        line_extension_amount: money::format(taxes::amount("line extension", &line.line_extension)?),
        invoice_period,
        tax_total,
        rounding_amount: money::ZERO.into(),
        item,
        price: Price {
            price_amount: money::format(taxes::amount("unit price", &line.unit_price)?),
            base_quantity: money::format_quantity(quantity),
        },
    })
}
