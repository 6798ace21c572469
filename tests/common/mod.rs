//! Shared utilities for integration testing.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Frame, Incoming};
use hyper::header::{HeaderMap, HeaderValue};
use hyper::server::conn::http2;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpListener;

/// A running mock backend.
#[allow(dead_code)]
pub struct MockBackend {
    pub addr: SocketAddr,
    /// Number of TCP connections accepted so far.
    pub connections: Arc<AtomicUsize>,
    /// Number of gRPC requests served so far.
    pub requests: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Start an HTTP/2 backend that echoes each gRPC request body back with `grpc-status: 0`.
///
/// The request frames are returned untouched, so a unary call receives its own message.
pub async fn start_echo_backend() -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(AtomicUsize::new(0));

    let accepted = connections.clone();
    let served = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let served = served.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<Incoming>| {
                            let served = served.clone();
                            async move {
                                served.fetch_add(1, Ordering::SeqCst);
                                echo(req).await
                            }
                        });
                        let _ = http2::Builder::new(TokioExecutor::new())
                            .serve_connection(TokioIo::new(socket), service)
                            .await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockBackend {
        addr,
        connections,
        requests,
    }
}

type EchoBody = StreamBody<
    futures_util::stream::Iter<std::vec::IntoIter<Result<Frame<Bytes>, Infallible>>>,
>;

async fn echo(req: Request<Incoming>) -> Result<Response<EchoBody>, hyper::Error> {
    let tenant = req.headers().get("x-scope-orgid").cloned();
    let body = req.into_body().collect().await?.to_bytes();

    let mut trailers = HeaderMap::new();
    trailers.insert("grpc-status", HeaderValue::from_static("0"));

    let frames = vec![Ok(Frame::data(body)), Ok(Frame::trailers(trailers))];
    let mut response = Response::new(StreamBody::new(futures_util::stream::iter(frames)));
    response
        .headers_mut()
        .insert("content-type", HeaderValue::from_static("application/grpc"));
    if let Some(tenant) = tenant {
        response.headers_mut().insert("x-scope-orgid", tenant);
    }
    Ok(response)
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
