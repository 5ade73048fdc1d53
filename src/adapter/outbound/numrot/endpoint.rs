//! Upstream URL construction.

use crate::domain::{Document, Nit};

pub const TOKEN_PATH: &str = "/v2/api/Token";
pub const SEND_PATH: &str = "/api/SendDIAN/Json/Pdf";
pub const RADIAN_INFO_PATH: &str = "/api/Radian/GetInfoDocument";
pub const RADIAN_BY_NUMBER_PATH: &str = "/api/Radian/GetDocumentByNumber";
pub const RADIAN_RECEIVED_PATH: &str = "/api/Radian/DocumentsReceived";
pub const RADIAN_EVENT_PATH: &str = "/api/Radian/SetEvent";

/// Join `base` and an `/api/...` path.
///
/// A base URL that already ends in `/api` does not get the segment twice.
#[must_use]
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    match path.strip_prefix("/api/") {
        Some(rest) if base.ends_with("/api") => format!("{base}/{rest}"),
        _ => format!("{base}{path}"),
    }
}

/// Token endpoint. Joined verbatim, its path is not under `/api`.
#[must_use]
pub fn token(base: &str) -> String {
    format!("{}{TOKEN_PATH}", base.trim().trim_end_matches('/'))
}

/// Support-document submission for `document` issued by `ofe`.
#[must_use]
pub fn support_document(ds_base: &str, ofe: &Nit, document: &Document) -> String {
    join(
        ds_base,
        &format!("/api/documentSinc/{}/{}", ofe.base(), document.number()),
    )
}

#[must_use]
pub fn resolutions(base: &str, nit: &str) -> String {
    join(base, &format!("/api/Resoluciones/{nit}"))
}

#[must_use]
pub fn document_info(base: &str, nit: &str, cufe: &str) -> String {
    join(base, &format!("/api/DocumentInfo/{nit}/{cufe}"))
}

#[must_use]
pub fn search_states(base: &str, nit: &str, number: &str) -> String {
    join(
        base,
        &format!("/api/searchestadosdian/{nit}/{number}?includeXml=true&includePdf=true"),
    )
}
