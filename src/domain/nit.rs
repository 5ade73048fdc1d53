//! NIT (national tax identifier) parsing.

use std::fmt;

/// A NIT split into its base number and optional check digit (DV).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nit {
    base: String,
    dv: Option<String>,
}

impl Nit {
    /// Parse a NIT of the form `base` or `base-dv`.
    ///
    /// Whitespace around either part is ignored. A trailing dash with no digit
    /// yields no DV.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.split_once('-') {
            Some((base, dv)) => {
                let dv = dv.trim();
                Self {
                    base: base.trim().to_string(),
                    dv: (!dv.is_empty()).then(|| dv.to_string()),
                }
            }
            None => Self {
                base: raw.to_string(),
                dv: None,
            },
        }
    }

    /// The number without check digit, used in `CompanyID` fields.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The check digit, if present.
    #[must_use]
    pub fn dv(&self) -> Option<&str> {
        self.dv.as_deref()
    }

    /// The check digit, or `fallback` when the NIT carried none.
    #[must_use]
    pub fn dv_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.dv.as_deref().unwrap_or(fallback)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

impl fmt::Display for Nit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dv {
            Some(dv) => write!(f, "{}-{}", self.base, dv),
            None => f.write_str(&self.base),
        }
    }
}
