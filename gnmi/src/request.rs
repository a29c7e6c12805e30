//! Assembly of wire requests from paths and option records.

use gnmi_proto as pb;

use crate::options::{GetOptions, SubscribeOptions};
use crate::path::{Path, PathParseError};

pub fn build_capabilities() -> pb::CapabilityRequest {
    pb::CapabilityRequest::default()
}

pub fn build_get(paths: &[Path], options: &GetOptions) -> Result<pb::GetRequest, PathParseError> {
    let prefix = parse_prefix(options.prefix.as_deref())?;
    Ok(pb::GetRequest {
        prefix: Some(prefix.to_proto()),
        path: paths.iter().map(Path::to_proto).collect(),
        r#type: options.data_type.to_proto(),
        encoding: options.encoding.to_proto(),
    })
}

/// Builds the single configuration message of a subscribe call: one
/// subscription per path, wrapped with the list-level options.
pub fn build_subscribe(
    paths: &[Path],
    options: &SubscribeOptions,
) -> Result<pb::SubscribeRequest, PathParseError> {
    let prefix = parse_prefix(options.prefix.as_deref())?;
    let subscription = paths
        .iter()
        .map(|path| pb::Subscription {
            path: Some(path.to_proto()),
            mode: options.submode.to_proto(),
            sample_interval: options.interval.unwrap_or(0),
            suppress_redundant: options.suppress,
            heartbeat_interval: options.heartbeat.unwrap_or(0),
        })
        .collect();

    let list = pb::SubscriptionList {
        prefix: Some(prefix.to_proto()),
        subscription,
        use_aliases: options.use_alias,
        qos: Some(pb::QosMarking {
            marking: options.qos,
        }),
        mode: options.mode.to_proto(),
        allow_aggregation: options.aggregate,
        encoding: options.encoding.to_proto(),
    };

    Ok(pb::SubscribeRequest {
        request: Some(pb::subscribe_request::Request::Subscribe(list)),
    })
}

/// An absent prefix resolves to the empty path.
fn parse_prefix(prefix: Option<&str>) -> Result<Path, PathParseError> {
    match prefix {
        Some(prefix) => prefix.parse(),
        None => Ok(Path::default()),
    }
}
