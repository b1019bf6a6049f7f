use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt};

use crate::errors::AppError;

/// Audio produced by the speech provider: a lazy, finite sequence of byte
/// chunks that can be consumed once.
pub struct AudioStream {
    inner: BoxStream<'static, Result<Bytes, AppError>>,
}

impl AudioStream {
    pub fn from_stream<S>(chunks: S) -> Self
    where
        S: Stream<Item = Result<Bytes, AppError>> + Send + 'static,
    {
        Self {
            inner: chunks.boxed(),
        }
    }
}

impl Stream for AudioStream {
    type Item = Result<Bytes, AppError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
