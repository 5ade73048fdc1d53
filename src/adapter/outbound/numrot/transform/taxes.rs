//! Tax grouping for documents and lines.

use rust_decimal::Decimal;

use crate::adapter::outbound::numrot::dto::request::{TaxCategory, TaxScheme, TaxSubtotal, TaxTotal};
use crate::domain::document::{Line, LineTax, Tribute};
use crate::domain::{money, Document};
use crate::error::TransformError;

/// Tax code of IVA.
pub const IVA_CODE: &str = "01";

/// Borrowed view over a tribute or a line tax; both carry the same fields.
#[derive(Debug, Clone, Copy)]
pub struct TaxLine<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub base: &'a str,
    pub percent: &'a str,
    pub amount: &'a str,
}

impl<'a> From<&'a Tribute> for TaxLine<'a> {
    fn from(t: &'a Tribute) -> Self {
        Self {
            code: &t.tax_code,
            name: &t.name,
            base: &t.base,
            percent: &t.percent,
            amount: &t.amount,
        }
    }
}

impl<'a> From<&'a LineTax> for TaxLine<'a> {
    fn from(t: &'a LineTax) -> Self {
        Self {
            code: &t.tax_code,
            name: &t.name,
            base: &t.base,
            percent: &t.percent,
            amount: &t.amount,
        }
    }
}

/// Parse an amount or report which field was malformed.
pub(crate) fn amount(field: &'static str, raw: &str) -> Result<Decimal, TransformError> {
    money::parse(raw).ok_or_else(|| TransformError::InvalidAmount {
        field,
        value: raw.to_string(),
    })
}

fn scheme_name<'a>(code: &str, name: &'a str) -> &'a str {
    if !name.trim().is_empty() {
        return name.trim();
    }
    match code.trim() {
        "01" => "IVA",
        "02" => "IC",
        "03" => "ICA",
        "04" => "INC",
        _ => "",
    }
}

/// Group tax lines by code, keeping first-seen order.
///
/// A group's amount is the two-decimal sum of its subtotals; groups summing
/// to zero are dropped.
pub fn group<'a, I>(lines: I) -> Result<Vec<TaxTotal>, TransformError>
where
    I: IntoIterator<Item = TaxLine<'a>>,
{
    let mut groups: Vec<(&'a str, Decimal, Vec<TaxSubtotal>)> = Vec::new();

    for line in lines {
        let tax = amount("tax amount", line.amount)?;
        let subtotal = TaxSubtotal {
            taxable_amount: money::format(amount("taxable amount", line.base)?),
            tax_amount: money::format(tax),
            tax_category: TaxCategory {
                percent: money::format(amount("tax percent", line.percent)?),
                tax_scheme: TaxScheme::new(line.code.trim(), scheme_name(line.code, line.name)),
            },
        };

        let code = line.code.trim();
        match groups.iter_mut().find(|(c, _, _)| *c == code) {
            Some((_, sum, subtotals)) => {
                *sum += tax;
                subtotals.push(subtotal);
            }
            None => groups.push((code, tax, vec![subtotal])),
        }
    }

    Ok(groups
        .into_iter()
        .filter(|(_, sum, _)| !sum.round_dp(2).is_zero())
        .map(|(_, sum, tax_subtotal)| TaxTotal {
            tax_amount: money::format(sum),
            rounding_amount: None,
            tax_subtotal,
        })
        .collect())
}

/// Document-level tax totals for FC/NC/ND.
///
/// Without tributes but with a non-zero aggregate tax, a single IVA group is
/// synthesized from the document totals. Document rounding, when non-zero,
/// goes on the first emitted group.
pub fn document_totals(document: &Document) -> Result<Vec<TaxTotal>, TransformError> {
    let totals = &document.totals;
    let mut groups = if document.tributes.is_empty() {
        let taxes = amount("taxes", &totals.taxes)?;
        if taxes.is_zero() {
            Vec::new()
        } else {
            vec![synthesized_iva(amount("line_extension", &totals.line_extension)?, taxes)]
        }
    } else {
        group(document.tributes.iter().map(TaxLine::from))?
    };

    if let Some(first) = groups.first_mut() {
        let rounding = amount("rounding", &totals.rounding)?;
        if !rounding.is_zero() {
            first.rounding_amount = Some(money::format(rounding));
        }
    }
    Ok(groups)
}

fn synthesized_iva(base: Decimal, taxes: Decimal) -> TaxTotal {
    let percent = if base.is_zero() {
        Decimal::ZERO
    } else {
        taxes / base * Decimal::ONE_HUNDRED
    };
    TaxTotal {
        tax_amount: money::format(taxes),
        rounding_amount: None,
        tax_subtotal: vec![TaxSubtotal {
            taxable_amount: money::format(base),
            tax_amount: money::format(taxes),
            tax_category: TaxCategory {
                percent: money::format(percent),
                tax_scheme: TaxScheme::new(IVA_CODE, "IVA"),
            },
        }],
    }
}

/// Per-line tax totals: positive line taxes only.
pub fn line_totals(line: &Line) -> Result<Vec<TaxTotal>, TransformError> {
    group(
        line.taxes
            .iter()
            .filter(|tax| money::is_positive(&tax.amount))
            .map(TaxLine::from),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Totals;

    fn tribute(code: &str, base: &str, percent: &str, amount: &str) -> Tribute {
        Tribute {
            tax_code: code.into(),
            name: String::new(),
            base: base.into(),
            percent: percent.into(),
            amount: amount.into(),
        }
    }

    #[test]
    fn tributes_group_by_code_in_first_seen_order() {
        let doc = Document {
            tributes: vec![
                tribute("01", "100.00", "19.00", "19.00"),
                tribute("04", "50.00", "8.00", "4.00"),
                tribute("01", "200", "19", "38"),
            ],
            ..Default::default()
        };
        let groups = document_totals(&doc).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tax_amount, "57.00");
        assert_eq!(groups[0].tax_subtotal.len(), 2);
        assert_eq!(groups[0].tax_subtotal[1].taxable_amount, "200.00");
        assert_eq!(groups[0].tax_subtotal[0].tax_category.tax_scheme.name, "IVA");
        assert_eq!(groups[1].tax_amount, "4.00");
        assert_eq!(groups[1].tax_subtotal[0].tax_category.tax_scheme.name, "INC");
    }

    #[test]
    fn zero_groups_are_dropped() {
        let doc = Document {
            tributes: vec![tribute("01", "100.00", "0.00", "0.00")],
            ..Default::default()
        };
        assert!(document_totals(&doc).unwrap().is_empty());
    }

    #[test]
    fn synthesizes_iva_from_aggregate_taxes() {
        let doc = Document {
            totals: Totals {
                line_extension: "176471.00".into(),
                taxes: "33529.00".into(),
                rounding: "0.50".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let groups = document_totals(&doc).unwrap();
        assert_eq!(groups.len(), 1);
        let sub = &groups[0].tax_subtotal[0];
        assert_eq!(sub.taxable_amount, "176471.00");
        assert_eq!(sub.tax_category.percent, "19.00");
        assert_eq!(sub.tax_category.tax_scheme.id, "01");
        assert_eq!(groups[0].rounding_amount.as_deref(), Some("0.50"));
    }

    #[test]
    fn no_tributes_and_no_taxes_emit_nothing() {
        let doc = Document {
            totals: Totals {
                taxes: "0.00".into(),
                rounding: "1.00".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(document_totals(&doc).unwrap().is_empty());
    }

    #[test]
    fn malformed_amount_names_the_field() {
        let doc = Document {
            tributes: vec![tribute("01", "abc", "19", "1")],
            ..Default::default()
        };
        assert!(matches!(
            document_totals(&doc),
            Err(TransformError::InvalidAmount { field: "taxable amount", .. })
        ));
    }
}
