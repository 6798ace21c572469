//! Opaque pass-through codec and unary forwarding.
//!
//! Messages are relayed as the raw bytes found inside gRPC frames; nothing
//! is decoded into typed messages.

use bytes::{Buf, BufMut, Bytes};
use http::uri::PathAndQuery;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::transport::Channel;
use tonic::{Response, Status};

use crate::director::context::OutboundContext;

/// Codec that moves message bodies through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl Codec for PassthroughCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = PassthroughCodec;
    type Decoder = PassthroughCodec;

    fn encoder(&mut self) -> Self::Encoder {
        PassthroughCodec
    }

    fn decoder(&mut self) -> Self::Decoder {
        PassthroughCodec
    }
}

impl Encoder for PassthroughCodec {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Bytes, dst: &mut EncodeBuf<'_>) -> Result<(), Status> {
        dst.put(item);
        Ok(())
    }
}

impl Decoder for PassthroughCodec {
    type Item = Bytes;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Bytes>, Status> {
        let len = src.remaining();
        Ok(Some(src.copy_to_bytes(len)))
    }
}

/// Relay one unary call over `channel` using the routed outbound context.
///
/// The call is abandoned with `Cancelled` if the outbound scope is cancelled first.
pub async fn forward_unary(
    channel: Channel,
    context: &OutboundContext,
    method: &str,
    payload: Bytes,
) -> Result<Response<Bytes>, Status> {
    let path: PathAndQuery = method
        .parse()
        .map_err(|e| Status::invalid_argument(format!("invalid method {method}: {e}")))?;

    let mut client = tonic::client::Grpc::new(channel);
    client
        .ready()
        .await
        .map_err(|e| Status::unavailable(format!("backend not ready: {e}")))?;

    let request = context.request(payload);
    tokio::select! {
        response = client.unary(request, path, PassthroughCodec) => response,
        _ = context.scope().cancelled() => Err(Status::cancelled("inbound call cancelled")),
    }
}
