//! Producer/consumer form of the exhaustive enumerator
//!
//! The enumeration runs on its own task and feeds a channel with room for a
//! single record, so it can never run more than one record ahead of whoever
//! is polling the stream.

use super::exhaustive::ExhaustiveEnumerator;
use super::types::{EnumeratorConfig, Identified, SearchableCollection};
use crate::error::{Error, Result};
use futures::Stream;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Stream every record of `source`.
///
/// Failures (configuration, upstream) arrive as a final `Err` item. Dropping
/// the stream stops the enumeration at its next record.
pub fn record_stream<S, T>(
    source: Arc<S>,
    config: EnumeratorConfig,
) -> impl Stream<Item = Result<T>> + Send + 'static
where
    S: SearchableCollection<T> + ?Sized + 'static,
    T: Identified + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<T>>(1);

    tokio::spawn(async move {
        let enumerator = ExhaustiveEnumerator::new(source.as_ref(), config);
        let outcome = enumerator
            .enumerate(|record| {
                let tx = tx.clone();
                async move {
                    tx.send(Ok(record))
                        .await
                        .map_err(|_| Error::consumer("record stream was dropped"))
                }
            })
            .await;

        match outcome {
            Ok(stats) => debug!(
                records = stats.records,
                queries = stats.queries,
                "Record stream finished"
            ),
            // Nobody left to tell if the receiver is gone
            Err(e) => {
                let _ = tx.send(Err(e)).await;
            }
        }
    });

    futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    })
}
