//! gRPC client for the `gnmi.gNMI` service.
//!
//! A thin wrapper over [`tonic::client::Grpc`] that issues the four service
//! methods on their canonical routes with a prost codec.

use http::uri::PathAndQuery;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::transport::Channel;
use tonic::{IntoRequest, IntoStreamingRequest, Response, Status, Streaming};

use crate::{
    CapabilityRequest, CapabilityResponse, GetRequest, GetResponse, SetRequest, SetResponse,
    SubscribeRequest, SubscribeResponse,
};

/// Client handle bound to one connected channel.
///
/// Cloning is cheap and clones share the underlying connection.
#[derive(Debug, Clone)]
pub struct GnmiClient {
    inner: Grpc<Channel>,
}

impl GnmiClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    /// Discover the models, encodings and protocol version the target
    /// supports.
    pub async fn capabilities(
        &mut self,
        request: impl IntoRequest<CapabilityRequest>,
    ) -> Result<Response<CapabilityResponse>, Status> {
        self.ready().await?;
        let codec: ProstCodec<CapabilityRequest, CapabilityResponse> = ProstCodec::default();
        self.inner
            .unary(
                request.into_request(),
                PathAndQuery::from_static("/gnmi.gNMI/Capabilities"),
                codec,
            )
            .await
    }

    /// Retrieve a snapshot of the data tree under the requested paths.
    pub async fn get(
        &mut self,
        request: impl IntoRequest<GetRequest>,
    ) -> Result<Response<GetResponse>, Status> {
        self.ready().await?;
        let codec: ProstCodec<GetRequest, GetResponse> = ProstCodec::default();
        self.inner
            .unary(
                request.into_request(),
                PathAndQuery::from_static("/gnmi.gNMI/Get"),
                codec,
            )
            .await
    }

    /// Apply a transactional set of delete/replace/update operations.
    pub async fn set(
        &mut self,
        request: impl IntoRequest<SetRequest>,
    ) -> Result<Response<SetResponse>, Status> {
        self.ready().await?;
        let codec: ProstCodec<SetRequest, SetResponse> = ProstCodec::default();
        self.inner
            .unary(
                request.into_request(),
                PathAndQuery::from_static("/gnmi.gNMI/Set"),
                codec,
            )
            .await
    }

    /// Open the duplex subscription stream.
    pub async fn subscribe(
        &mut self,
        request: impl IntoStreamingRequest<Message = SubscribeRequest>,
    ) -> Result<Response<Streaming<SubscribeResponse>>, Status> {
        self.ready().await?;
        let codec: ProstCodec<SubscribeRequest, SubscribeResponse> = ProstCodec::default();
        self.inner
            .streaming(
                request.into_streaming_request(),
                PathAndQuery::from_static("/gnmi.gNMI/Subscribe"),
                codec,
            )
            .await
    }

    async fn ready(&mut self) -> Result<(), Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unknown(format!("service not ready: {e}")))
    }
}
