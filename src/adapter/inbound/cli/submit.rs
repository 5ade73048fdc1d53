//! `submit` and `transform`: batch files in, batch reply or payloads out.

use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::command::BatchArgs;
use super::output;
use crate::adapter::outbound::numrot::dto::DocumentPayload;
use crate::domain::DocumentBatch;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::{build_transformer, load_customers, Gateway};
use crate::infrastructure::config::Config;

/// Read a batch file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a batch.
pub fn read_batch(path: &Path) -> Result<DocumentBatch> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Dispatch the batch and print the reply. Ctrl-C cancels the batch; the
/// reply still lists every document.
pub async fn execute_submit(config: &Config, args: &BatchArgs) -> Result<()> {
    let batch = read_batch(&args.file)?;
    let customers = load_customers(args.customers.as_deref())?;
    let gateway = Gateway::from_config(config, customers);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling batch");
                cancel.cancel();
            }
        })
    };

    let result = gateway.engine.register_document(batch, &cancel).await;
    interrupt.abort();
    gateway.engine.shutdown();

    let reply = result?;
    output::field("Message", &reply.message);
    output::field("Lote", &reply.lote);
    output::field("Processed", reply.documentos_procesados.len());
    output::field("Failed", reply.documentos_fallidos.len());
    output::json(&reply)
}

#[derive(Serialize)]
struct DryRun {
    documento: String,
    tipo: &'static str,
    payload: DocumentPayload,
}

/// Print the payload every document of the batch would be sent as.
pub fn execute_transform(config: &Config, args: &BatchArgs) -> Result<()> {
    let batch = read_batch(&args.file)?;
    let Some((kind, documents)) = batch.into_selected() else {
        return Err(Error::NoDocuments);
    };
    let transformer = build_transformer(config, load_customers(args.customers.as_deref())?);

    let payloads = documents
        .iter()
        .map(|document| {
            transformer.transform(kind, document).map(|payload| DryRun {
                documento: document.number(),
                tipo: kind.code(),
                payload,
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    output::json(&payloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DocumentKind;
    use crate::testkit::document;

    #[test]
    fn read_batch_parses_kind_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        let batch = document::batch(DocumentKind::CreditNote, vec![document::credit_note("7")]);
        std::fs::write(&path, serde_json::to_vec(&batch).unwrap()).unwrap();

        let (kind, docs) = read_batch(&path).unwrap().into_selected().unwrap();
        assert_eq!(kind, DocumentKind::CreditNote);
        assert_eq!(docs[0].number(), "NC7");
    }

    #[test]
    fn read_batch_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(read_batch(&path), Err(Error::Json(_))));
    }
}
