//! Streamed response bodies.

use crate::error::{GalleryError, Result};
use crate::types::DownloadProgress;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Response;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;

// Upper bound on the buffer reserved up front by `DataStream::bytes`.
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

/// Body of a successful download, preview or video response.
///
/// The stream owns the underlying connection. Dropping it, whether fully read
/// or not, releases the connection.
pub struct DataStream {
    inner: BoxStream<'static, reqwest::Result<Bytes>>,
    content_length: Option<u64>,
    headers: HeaderMap,
}

impl DataStream {
    pub(crate) fn new(response: Response) -> Self {
        let content_length = response.content_length();
        let headers = response.headers().clone();

        Self {
            inner: response.bytes_stream().boxed(),
            content_length,
            headers,
        }
    }

    /// Declared `Content-Length`, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Response headers as received.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Next chunk of the body, `None` at the end.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        self.next().await.transpose()
    }

    /// Collect the remaining body into memory.
    pub async fn bytes(self) -> Result<Vec<u8>> {
        // Declared length is only a hint from the server
        let capacity = self.content_length.map_or(0, |n| n.min(MAX_PREALLOCATION)) as usize;
        self.try_fold(Vec::with_capacity(capacity), |mut buf, chunk| async move {
            buf.extend_from_slice(&chunk);
            Ok::<_, GalleryError>(buf)
        })
        .await
    }

    /// Copy the remaining body into `writer`, returning the byte count.
    pub async fn copy_to<W>(self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        copy_chunks(self, writer).await
    }

    /// Adapt into an [`AsyncRead`].
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(self.map_err(io::Error::other))
    }

    /// Wrap so that every chunk reports progress to `on_progress`.
    pub fn with_progress<F>(self, data_id: i64, on_progress: F) -> ProgressStream<Self, F>
    where
        F: FnMut(DownloadProgress) + Unpin,
    {
        let total = self.content_length;
        ProgressStream::new(self, data_id, total, on_progress)
    }
}

impl Stream for DataStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner
            .poll_next_unpin(cx)
            .map(|item| item.map(|chunk| chunk.map_err(GalleryError::Transport)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl std::fmt::Debug for DataStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Chunk stream that reports the running byte count after every chunk.
///
/// The callback runs inline on the polling task, once per chunk pulled from
/// the inner stream.
pub struct ProgressStream<S, F> {
    inner: S,
    data_id: i64,
    bytes_received: u64,
    bytes_total: Option<u64>,
    on_progress: F,
}

impl<S, F> ProgressStream<S, F>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    F: FnMut(DownloadProgress) + Unpin,
{
    pub fn new(inner: S, data_id: i64, bytes_total: Option<u64>, on_progress: F) -> Self {
        Self {
            inner,
            data_id,
            bytes_received: 0,
            bytes_total,
            on_progress,
        }
    }

    /// Bytes passed through so far.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }
}

impl<S, F> Stream for ProgressStream<S, F>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    F: FnMut(DownloadProgress) + Unpin,
{
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.bytes_received += chunk.len() as u64;
                (this.on_progress)(DownloadProgress {
                    data_id: this.data_id,
                    bytes_received: this.bytes_received,
                    bytes_total: this.bytes_total,
                });
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}

/// Write every chunk of `stream` into `writer` and flush it.
pub(crate) async fn copy_chunks<S, W>(mut stream: S, writer: &mut W) -> Result<u64>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    writer.flush().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let mut seen = Vec::new();
        let progress = ProgressStream::new(
            chunks(&["abc", "", "defgh", "ij"]),
            9,
            Some(10),
            |p: DownloadProgress| seen.push(p),
        );

        let mut out = Vec::new();
        let written = copy_chunks(progress, &mut out).await.unwrap();

        assert_eq!(written, 10);
        assert_eq!(out, b"abcdefghij");
        let counts: Vec<u64> = seen.iter().map(|p| p.bytes_received).collect();
        assert_eq!(counts, vec![3, 3, 8, 10]);
        assert!(seen.iter().all(|p| p.data_id == 9 && p.bytes_total == Some(10)));
    }

    #[tokio::test]
    async fn test_progress_with_unknown_total() {
        let mut last = None;
        let mut progress = ProgressStream::new(chunks(&["xy"]), 1, None, |p| last = Some(p));

        while progress.next().await.is_some() {}
        assert_eq!(progress.bytes_received(), 2);
        drop(progress);

        let last = last.unwrap();
        assert_eq!(last.bytes_received, 2);
        assert_eq!(last.bytes_total, None);
        assert_eq!(last.fraction(), None);
    }

    #[tokio::test]
    async fn test_copy_stops_on_error() {
        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"ok")),
            Err(GalleryError::Parse("broken".into())),
            Ok(Bytes::from_static(b"never")),
        ]);

        let mut out = Vec::new();
        let result = copy_chunks(failing, &mut out).await;

        assert!(matches!(result, Err(GalleryError::Parse(_))));
        assert_eq!(out, b"ok");
    }
}
