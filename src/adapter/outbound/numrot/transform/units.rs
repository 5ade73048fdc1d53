//! Internal unit codes to the UN/ECE codes the upstream accepts.

const UNIT_CODES: [(&str, &str); 16] = [
    ("UN", "94"),
    ("KG", "KGM"),
    ("LT", "LTR"),
    ("DOC", "DZN"),
    ("MT", "MTR"),
    ("GL", "GLL"),
    ("HR", "HUR"),
    ("M2", "MTK"),
    ("M3", "MTQ"),
    ("CJ", "BX"),
    ("PQ", "PK"),
    ("GR", "GRM"),
    ("ML", "MLT"),
    ("KM", "KMT"),
    ("DIA", "DAY"),
    ("MES", "MON"),
];

/// Map a unit code; unknown codes pass through unchanged.
#[must_use]
pub fn map_unit_code(code: &str) -> String {
    let trimmed = code.trim();
    UNIT_CODES
        .iter()
        .find(|(internal, _)| internal.eq_ignore_ascii_case(trimmed))
        .map_or_else(|| trimmed.to_string(), |(_, wire)| (*wire).to_string())
}
