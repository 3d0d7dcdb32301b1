//! Tower middleware that emits a flow record for every request.
//!
//! The record is captured and sent before the request reaches the inner
//! service; the request itself is passed on untouched.
//!
//! ```ignore
//! let emitter = Emitter::create("127.0.0.1:9995")?;
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(FlowLayer::new(emitter));
//! ```

use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::emitter::Emitter;

/// Layer that wraps services in a [`FlowService`].
#[derive(Debug, Clone)]
pub struct FlowLayer {
    emitter: Emitter,
}

impl FlowLayer {
    pub fn new(emitter: Emitter) -> Self {
        Self { emitter }
    }
}

impl<S> Layer<S> for FlowLayer {
    type Service = FlowService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FlowService {
            inner,
            emitter: self.emitter.clone(),
        }
    }
}

/// Service that emits each request to the collector, then forwards it.
#[derive(Debug, Clone)]
pub struct FlowService<S> {
    inner: S,
    emitter: Emitter,
}

impl<S, B> Service<Request<B>> for FlowService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        self.emitter.emit(&request);
        self.inner.call(request)
    }
}
