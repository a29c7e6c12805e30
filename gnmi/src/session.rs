//! Connected session against one target.
//!
//! A session owns exactly one channel, dialed at construction and reused
//! for every call. Methods take `&mut self`: a session serves one logical
//! thread of control, and callers wanting parallelism open independent
//! sessions.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tonic::Request;
use tonic::metadata::MetadataMap;
use tonic::transport::Endpoint;
use tracing::{debug, info, warn};

use gnmi_proto as pb;
use gnmi_proto::client::GnmiClient;

use crate::error::{Error, Result};
use crate::options::{ConnectOptions, GetOptions, SubscribeOptions};
use crate::path::{self, IntoPath};
use crate::request;
use crate::response::{CapabilitiesResponse, GetResponse};
use crate::stream::SubscriptionStream;

/// IANA-assigned gNMI port, used when the target string names none.
pub const DEFAULT_PORT: u16 = 9339;

/// Target address as `host`, `host:port`, `[v6]` or `[v6]:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Target> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('[') {
            let Some((host, tail)) = rest.split_once(']') else {
                return Err(Error::InvalidTarget(s.to_string()));
            };
            if host.is_empty() {
                return Err(Error::InvalidTarget(s.to_string()));
            }
            let port = match tail.strip_prefix(':') {
                Some(port) => port
                    .parse()
                    .map_err(|_| Error::InvalidTarget(s.to_string()))?,
                None if tail.is_empty() => DEFAULT_PORT,
                None => return Err(Error::InvalidTarget(s.to_string())),
            };
            return Ok(Target {
                host: host.to_string(),
                port,
            });
        }

        match s.rsplit_once(':') {
            // a second ':' means an unbracketed IPv6 literal
            Some((host, _)) if host.contains(':') => Err(Error::InvalidTarget(s.to_string())),
            Some((host, port)) if !host.is_empty() => {
                let port = port
                    .parse()
                    .map_err(|_| Error::InvalidTarget(s.to_string()))?;
                Ok(Target {
                    host: host.to_string(),
                    port,
                })
            }
            Some(_) => Err(Error::InvalidTarget(s.to_string())),
            None if !s.is_empty() => Ok(Target {
                host: s.to_string(),
                port: DEFAULT_PORT,
            }),
            None => Err(Error::InvalidTarget(s.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl Target {
    fn uri(&self) -> String {
        format!("http://{self}")
    }
}

/// Live session holding the channel and the metadata attached to every
/// request.
#[derive(Debug)]
pub struct Session {
    client: GnmiClient,
    metadata: MetadataMap,
}

impl Session {
    /// Dials `target` and builds the per-request metadata.
    ///
    /// The channel is always plaintext. A certificate store is accepted
    /// for forward compatibility but does not enable TLS yet, and the
    /// host override only matters once it does.
    pub async fn connect(target: &str, options: &ConnectOptions) -> Result<Session> {
        let target: Target = target.parse()?;

        if options.certificates.is_some() {
            warn!(%target, "certificates supplied but TLS is not implemented; connecting in the clear");
        }
        if let Some(host) = &options.host_override {
            debug!(%host, "host override ignored on a plaintext channel");
        }

        let endpoint = Endpoint::from_shared(target.uri())?;
        let channel = endpoint.connect().await?;
        info!(%target, "gNMI channel established");

        let mut metadata = MetadataMap::new();
        if let Some(credentials) = &options.credentials {
            metadata.insert("username", credentials.username.parse()?);
            metadata.insert("password", credentials.password.parse()?);
        }

        Ok(Session {
            client: GnmiClient::new(channel),
            metadata,
        })
    }

    /// Asks the target for its models, encodings and protocol version.
    pub async fn capabilities(&mut self) -> Result<CapabilitiesResponse> {
        let req = self.attach_metadata(request::build_capabilities());
        let response = self.client.capabilities(req).await?;
        Ok(CapabilitiesResponse::from(response.into_inner()))
    }

    /// Retrieves a snapshot of the given paths.
    pub async fn get<I>(&mut self, paths: I, options: &GetOptions) -> Result<GetResponse>
    where
        I: IntoIterator,
        I::Item: IntoPath,
    {
        let paths = path::into_paths(paths)?;
        debug!(paths = paths.len(), "issuing get");
        let req = self.attach_metadata(request::build_get(&paths, options)?);
        let response = self.client.get(req).await?;
        Ok(GetResponse::from(response.into_inner()))
    }

    /// Opens a subscription for the given paths.
    ///
    /// One configuration message is sent and nothing further goes out on
    /// the stream. `options.timeout` becomes the request deadline; when it
    /// expires the stream fails with `DeadlineExceeded`.
    pub async fn subscribe<I>(
        &mut self,
        paths: I,
        options: &SubscribeOptions,
    ) -> Result<SubscriptionStream<tonic::Streaming<pb::SubscribeResponse>>>
    where
        I: IntoIterator,
        I::Item: IntoPath,
    {
        let paths = path::into_paths(paths)?;
        let message = request::build_subscribe(&paths, options)?;

        let mut req = self.attach_metadata(tokio_stream::once(message));
        if let Some(timeout) = options.timeout {
            req.set_timeout(Duration::from_secs(timeout));
        }
        debug!(paths = paths.len(), timeout = ?options.timeout, "opening subscription");

        let response = self.client.subscribe(req).await?;
        Ok(SubscriptionStream::new(response.into_inner()))
    }

    /// Transactional configuration changes are not implemented; the
    /// request schema exists in `gnmi_proto` for when they are.
    pub async fn set(&mut self) -> Result<()> {
        Err(Error::Unimplemented("set"))
    }

    fn attach_metadata<T>(&self, message: T) -> Request<T> {
        let mut req = Request::new(message);
        *req.metadata_mut() = self.metadata.clone();
        req
    }
}
