//! Lazy delta stream over a chunked byte body

use async_stream::stream;
use futures::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::sse::SseDecoder;

/// A stream of content deltas, in the order the gateway sent them
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Turn a byte body into a stream of deltas.
///
/// Ends after the terminator line or when the body ends. Cancelling `cancel`
/// stops reading at the next await point and yields a single
/// [`Error::Aborted`].
pub fn decode_stream<S, B, E>(body: S, cancel: CancellationToken) -> DeltaStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Error> + Send + 'static,
{
    let mut body = Box::pin(body);

    Box::pin(stream! {
        let mut decoder = SseDecoder::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                item = body.next() => Some(item),
            };

            let Some(item) = next else {
                tracing::debug!("Delta stream cancelled");
                yield Err(Error::Aborted);
                return;
            };

            match item {
                None => break,
                Some(Err(e)) => {
                    yield Err(e.into());
                    return;
                }
                Some(Ok(chunk)) => {
                    let feed = decoder.feed(chunk.as_ref());
                    for delta in feed.deltas {
                        yield Ok(delta);
                    }
                    if feed.done {
                        return;
                    }
                }
            }
        }

        if !decoder.buffered().trim().is_empty() {
            tracing::warn!(
                "Stream ended with {} undecoded bytes left in the buffer",
                decoder.buffered().len()
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(content: &str) -> String {
        format!(
            "data: {}\n",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    fn body_of(chunks: Vec<String>) -> impl Stream<Item = std::result::Result<Vec<u8>, Error>> + Send {
        futures::stream::iter(chunks.into_iter().map(|c| Ok(c.into_bytes())))
    }

    #[tokio::test]
    async fn test_collects_in_order() {
        let chunks = vec![frame("a"), frame("b"), frame("c"), "data: [DONE]\n".to_string()];
        let deltas: Vec<String> = decode_stream(body_of(chunks), CancellationToken::new())
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(deltas.concat(), "abc");
    }

    #[tokio::test]
    async fn test_ends_without_terminator() {
        let chunks = vec![frame("only")];
        let deltas: Vec<_> = decode_stream(body_of(chunks), CancellationToken::new())
            .collect()
            .await;
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].as_ref().unwrap(), "only");
    }

    #[tokio::test]
    async fn test_cancelled_yields_aborted() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let body = futures::stream::pending::<std::result::Result<Vec<u8>, Error>>();
        let items: Vec<_> = decode_stream(body, cancel).collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Aborted)));
    }

    #[tokio::test]
    async fn test_body_error_is_forwarded() {
        let body = futures::stream::iter(vec![
            Ok(frame("x").into_bytes()),
            Err(Error::UnexpectedResponse("reset".into())),
        ]);
        let items: Vec<_> = decode_stream(body, CancellationToken::new()).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "x");
        assert!(matches!(items[1], Err(Error::UnexpectedResponse(_))));
    }

    #[tokio::test]
    async fn test_chunks_split_mid_record() {
        let whole = format!("{}{}data: [DONE]\n", frame("Good day, "), frame("Sir."));
        let (a, b) = whole.split_at(17);
        let chunks = vec![a.to_string(), b.to_string()];
        let deltas: Vec<String> = decode_stream(body_of(chunks), CancellationToken::new())
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["Good day, ", "Sir."]);
    }
}
