use crate::error::RequestError;
use bytes::{Buf, Bytes};
use http_body_util::Full;
use hyper::body::Body;
use pin_project_lite::pin_project;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

#[inline]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[inline]
pub fn byte_body<B: Into<Bytes>>(bytes: B) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// Upper bound on the buffer reserved up front from a declared length. The
/// buffer still grows past it while draining.
pub const MAX_PRESIZE: usize = 64 * 1024;

pin_project! {
    /// Collects every data frame of a response body into one buffer.
    pub struct DrainBodyFuture<B: Body> {
        #[pin]
        body: B,
        buf: Vec<u8>,
    }
}

impl<B> DrainBodyFuture<B>
where
    B: Body,
{
    /// `content_length` only sizes the initial buffer, capped at
    /// [`MAX_PRESIZE`]; it is never trusted beyond that.
    #[inline]
    #[must_use]
    pub fn new_trusted_length(body: B, content_length: usize) -> Self {
        Self {
            body,
            buf: Vec::with_capacity(content_length.min(MAX_PRESIZE)),
        }
    }
}

impl<B> Future for DrainBodyFuture<B>
where
    B: Body,
    B::Error: Display,
{
    type Output = Result<Vec<u8>, RequestError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slf = self.project();
        loop {
            let Some(next_res) = std::task::ready!(slf.body.as_mut().poll_frame(cx)) else {
                return Poll::Ready(Ok(std::mem::take(slf.buf)));
            };
            let frame = match next_res {
                Ok(frame) => frame,
                Err(e) => {
                    return Poll::Ready(Err(RequestError::Body(e.to_string())));
                }
            };
            // Trailers carry nothing we keep.
            if let Ok(data) = frame.into_data() {
                slf.buf.extend_from_slice(data.chunk());
            }
            if slf.body.is_end_stream() {
                return Poll::Ready(Ok(std::mem::take(slf.buf)));
            }
        }
    }
}
