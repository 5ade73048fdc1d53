//! `event` and `radian` listings.

use super::command::{EventArgs, LookupArgs, RadianCommand, RangeArgs};
use super::output;
use crate::adapter::outbound::numrot::EventRequest;
use crate::domain::event::{DateRange, EventKind};
use crate::error::Result;
use crate::infrastructure::bootstrap::Gateway;
use crate::infrastructure::config::Config;

/// Build the event request from the command line, validating the kind.
///
/// # Errors
///
/// Returns a validation error for an unknown event kind.
pub fn event_request(args: &EventArgs) -> Result<EventRequest> {
    Ok(EventRequest {
        kind: args.kind.parse::<EventKind>()?,
        document_number: args.document.trim().to_string(),
        supplier_nit: args.supplier_nit.trim().to_string(),
        supplier_name: args.supplier_name.trim().to_string(),
        rejection_code: args.rejection_code.clone(),
    })
}

pub async fn execute_event(config: &Config, args: &EventArgs) -> Result<()> {
    let request = event_request(args)?;
    let gateway = Gateway::from_config(config, None);
    output::field("Event", request.kind);
    output::field("Document", &request.document_number);
    output::json(&gateway.radian.register_event(&request).await?)
}

pub async fn execute(config: &Config, command: &RadianCommand) -> Result<()> {
    let gateway = Gateway::from_config(config, None);
    let value = match command {
        RadianCommand::Emitted(RangeArgs { from, to }) => {
            gateway
                .radian
                .emitted_documents(&DateRange::parse(from, to)?)
                .await?
        }
        RadianCommand::Received(RangeArgs { from, to }) => {
            gateway
                .radian
                .received_documents(&DateRange::parse(from, to)?)
                .await?
        }
        RadianCommand::Lookup(LookupArgs {
            supplier_nit,
            number,
        }) => {
            gateway
                .radian
                .document_by_number(supplier_nit.trim(), number.trim())
                .await?
        }
    };
    output::json(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::error::Error;

    fn args(kind: &str) -> EventArgs {
        EventArgs {
            kind: kind.into(),
            document: " FE100 ".into(),
            supplier_nit: "900123456".into(),
            supplier_name: "Proveedor SAS".into(),
            rejection_code: None,
        }
    }

    #[test]
    fn event_kind_is_case_insensitive() {
        let request = event_request(&args("acuse")).unwrap();
        assert_eq!(request.kind, EventKind::Acuse);
        assert_eq!(request.document_number, "FE100");
    }

    #[test]
    fn unknown_event_kind_is_rejected() {
        assert!(matches!(
            event_request(&args("ANULACION")),
            Err(Error::Domain(DomainError::UnknownEventKind(_)))
        ));
    }
}
