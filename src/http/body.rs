//! Response body types
//!
//! Every handler returns a [`ResponseBody`]. Fixed payloads are served by
//! [`ZeroBody`], which streams frames out of a static zero buffer instead of
//! allocating the whole payload.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};

/// Size of each frame emitted by [`ZeroBody`]
pub const ZERO_CHUNK_SIZE: usize = 8192;

static ZERO_CHUNK: [u8; ZERO_CHUNK_SIZE] = [0; ZERO_CHUNK_SIZE];

/// Body type shared by all responses
pub type ResponseBody = BoxBody<Bytes, Infallible>;

pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new().boxed()
}

pub fn full<T: Into<Bytes>>(chunk: T) -> ResponseBody {
    Full::new(chunk.into()).boxed()
}

/// A body of `len` zero bytes, emitted in [`ZERO_CHUNK_SIZE`] frames
#[derive(Debug, Clone, Copy)]
pub struct ZeroBody {
    remaining: u64,
}

impl ZeroBody {
    pub const fn new(len: u64) -> Self {
        Self { remaining: len }
    }

    pub fn boxed(self) -> ResponseBody {
        BodyExt::boxed(self)
    }
}

impl Body for ZeroBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.remaining == 0 {
            return Poll::Ready(None);
        }

        let len =
            usize::try_from(this.remaining).map_or(ZERO_CHUNK_SIZE, |r| r.min(ZERO_CHUNK_SIZE));
        this.remaining -= len as u64;
        Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(&ZERO_CHUNK[..len])))))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}
