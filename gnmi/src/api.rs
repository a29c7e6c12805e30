//! One-shot operations.
//!
//! Each function dials the target, runs a single RPC and hands back the
//! result. Callers that want to reuse a channel across calls work with
//! [`Session`] directly instead.

use serde_json::Value as Json;
use tracing::debug;

use gnmi_proto as pb;

use crate::error::{Error, Result};
use crate::options::{ConnectOptions, GetOptions, SubscribeOptions};
use crate::path::{self, IntoPath, Path};
use crate::response::{CapabilitiesResponse, Value};
use crate::session::Session;
use crate::stream::PathValues;

/// Fetches the target's capabilities.
pub async fn capabilities(target: &str, connect: &ConnectOptions) -> Result<CapabilitiesResponse> {
    let mut session = Session::connect(target, connect).await?;
    session.capabilities().await
}

/// Fetches a snapshot of `paths` and yields one `(path, value)` pair per
/// update, with each path fully qualified against its notification prefix.
pub async fn get<I>(
    target: &str,
    paths: I,
    options: &GetOptions,
    connect: &ConnectOptions,
) -> Result<impl Iterator<Item = (String, Option<Value>)>>
where
    I: IntoIterator,
    I::Item: IntoPath,
{
    let mut session = Session::connect(target, connect).await?;
    let response = session.get(paths, options).await?;
    Ok(response.into_pairs())
}

/// Subscribes to `paths` and returns the flattened `(path, value)` stream.
///
/// The session is parked inside the returned stream so the channel stays
/// alive for as long as the caller keeps polling.
pub async fn subscribe<I>(
    target: &str,
    paths: I,
    options: &SubscribeOptions,
    connect: &ConnectOptions,
) -> Result<PathValues<tonic::Streaming<pb::SubscribeResponse>>>
where
    I: IntoIterator,
    I::Item: IntoPath,
{
    let mut session = Session::connect(target, connect).await?;
    let stream = session.subscribe(paths, options).await?;
    Ok(PathValues::new(stream).with_session(session))
}

/// Deletes `paths` from the target's configuration.
pub async fn delete<I>(target: &str, paths: I, connect: &ConnectOptions) -> Result<()>
where
    I: IntoIterator,
    I::Item: IntoPath,
{
    let paths = path::into_paths(paths)?;
    debug!(paths = paths.len(), "requesting delete");
    let mut session = Session::connect(target, connect).await?;
    session.set().await
}

/// Replaces the subtree at each path with the paired JSON value.
pub async fn replace<I, P>(target: &str, updates: I, connect: &ConnectOptions) -> Result<()>
where
    I: IntoIterator<Item = (P, Json)>,
    P: IntoPath,
{
    let updates = parse_pairs(updates)?;
    debug!(updates = updates.len(), "requesting replace");
    let mut session = Session::connect(target, connect).await?;
    session.set().await
}

/// Merges the paired JSON value into the subtree at each path.
pub async fn update<I, P>(target: &str, updates: I, connect: &ConnectOptions) -> Result<()>
where
    I: IntoIterator<Item = (P, Json)>,
    P: IntoPath,
{
    let updates = parse_pairs(updates)?;
    debug!(updates = updates.len(), "requesting update");
    let mut session = Session::connect(target, connect).await?;
    session.set().await
}

fn parse_pairs<I, P>(pairs: I) -> Result<Vec<(Path, Json)>>
where
    I: IntoIterator<Item = (P, Json)>,
    P: IntoPath,
{
    pairs
        .into_iter()
        .map(|(path, value)| {
            path.into_path()
                .map(|path| (path, value))
                .map_err(Error::from)
        })
        .collect()
}
