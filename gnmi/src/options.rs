//! Option records and enum tables for requests.
//!
//! Symbolic names are resolved through [`FromStr`] (case-insensitive,
//! `-` and `_` interchangeable) and mapped to wire enum codes with
//! `to_proto`.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gnmi_proto as pb;

/// Option value that matches no entry in the field's lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {value:?}")]
pub struct InvalidOption {
    pub field: &'static str,
    pub value: String,
}

impl InvalidOption {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

/// Value encoding requested from the target.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Encoding {
    #[default]
    Json,
    Bytes,
    Proto,
    Ascii,
    JsonIetf,
}

impl Encoding {
    /// Convert to the wire encoding value
    pub fn to_proto(&self) -> i32 {
        match self {
            Encoding::Json => pb::Encoding::Json as i32,
            Encoding::Bytes => pb::Encoding::Bytes as i32,
            Encoding::Proto => pb::Encoding::Proto as i32,
            Encoding::Ascii => pb::Encoding::Ascii as i32,
            Encoding::JsonIetf => pb::Encoding::JsonIetf as i32,
        }
    }
}

impl FromStr for Encoding {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, InvalidOption> {
        match normalize(s).as_str() {
            "json" => Ok(Encoding::Json),
            "bytes" => Ok(Encoding::Bytes),
            "proto" => Ok(Encoding::Proto),
            "ascii" => Ok(Encoding::Ascii),
            "json_ietf" => Ok(Encoding::JsonIetf),
            _ => Err(InvalidOption::new("encoding", s)),
        }
    }
}

/// Class of data a get retrieves.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    #[default]
    All,
    Config,
    State,
    Operational,
}

impl DataType {
    pub fn to_proto(&self) -> i32 {
        match self {
            DataType::All => pb::get_request::DataType::All as i32,
            DataType::Config => pb::get_request::DataType::Config as i32,
            DataType::State => pb::get_request::DataType::State as i32,
            DataType::Operational => pb::get_request::DataType::Operational as i32,
        }
    }
}

impl FromStr for DataType {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, InvalidOption> {
        match normalize(s).as_str() {
            "all" => Ok(DataType::All),
            "config" => Ok(DataType::Config),
            "state" => Ok(DataType::State),
            "operational" => Ok(DataType::Operational),
            _ => Err(InvalidOption::new("type", s)),
        }
    }
}

/// How the whole subscription list is delivered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamMode {
    #[default]
    Stream,
    Once,
    Poll,
}

impl StreamMode {
    pub fn to_proto(&self) -> i32 {
        match self {
            StreamMode::Stream => pb::subscription_list::Mode::Stream as i32,
            StreamMode::Once => pb::subscription_list::Mode::Once as i32,
            StreamMode::Poll => pb::subscription_list::Mode::Poll as i32,
        }
    }
}

impl FromStr for StreamMode {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, InvalidOption> {
        match normalize(s).as_str() {
            "stream" => Ok(StreamMode::Stream),
            "once" => Ok(StreamMode::Once),
            "poll" => Ok(StreamMode::Poll),
            _ => Err(InvalidOption::new("mode", s)),
        }
    }
}

/// Trigger policy for each subscribed path.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionMode {
    TargetDefined,
    #[default]
    OnChange,
    Sample,
}

impl SubscriptionMode {
    pub fn to_proto(&self) -> i32 {
        match self {
            SubscriptionMode::TargetDefined => pb::SubscriptionMode::TargetDefined as i32,
            SubscriptionMode::OnChange => pb::SubscriptionMode::OnChange as i32,
            SubscriptionMode::Sample => pb::SubscriptionMode::Sample as i32,
        }
    }
}

impl FromStr for SubscriptionMode {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, InvalidOption> {
        match normalize(s).as_str() {
            "target_defined" => Ok(SubscriptionMode::TargetDefined),
            "on_change" => Ok(SubscriptionMode::OnChange),
            "sample" => Ok(SubscriptionMode::Sample),
            _ => Err(InvalidOption::new("submode", s)),
        }
    }
}

/// Options for a get request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GetOptions {
    /// Path prefix applied to every requested path
    pub prefix: Option<String>,

    /// Value encoding to request
    pub encoding: Encoding,

    /// Class of data to retrieve
    #[serde(rename = "type")]
    pub data_type: DataType,
}

/// Options for a subscribe request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubscribeOptions {
    /// Path prefix applied to every subscribed path
    pub prefix: Option<String>,

    /// Delivery mode for the subscription list
    pub mode: StreamMode,

    /// Trigger policy for each path
    pub submode: SubscriptionMode,

    /// Value encoding to request
    pub encoding: Encoding,

    /// DSCP marking for the stream
    pub qos: u32,

    /// Allow the target to aggregate values
    pub aggregate: bool,

    /// Suppress unchanged sampled values
    pub suppress: bool,

    /// Request target-side path aliasing
    pub use_alias: bool,

    /// Sample interval in nanoseconds, passed through unmodified
    pub interval: Option<u64>,

    /// Heartbeat interval in nanoseconds, passed through unmodified
    pub heartbeat: Option<u64>,

    /// Deadline for the whole stream, in seconds
    pub timeout: Option<u64>,
}

/// Authentication credentials, sent as `username`/`password` metadata on
/// every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Username for authentication
    pub username: String,

    /// Password for authentication
    pub password: String,
}

/// Certificate bundle, accepted for forward compatibility. The channel is
/// established in the clear no matter what is supplied here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateStore {
    /// Path to CA certificate file
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,

    /// Path to client certificate file
    #[serde(default)]
    pub client_cert: Option<PathBuf>,

    /// Path to client key file
    #[serde(default)]
    pub client_key: Option<PathBuf>,
}

/// Connection-level options shared by every entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    /// Authentication credentials
    pub credentials: Option<Credentials>,

    /// Certificate bundle (see [`CertificateStore`])
    pub certificates: Option<CertificateStore>,

    /// Host name override, only meaningful once TLS exists
    pub host_override: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_defaults() {
        let options = GetOptions::default();
        assert_eq!(options.prefix, None);
        assert_eq!(options.encoding, Encoding::Json);
        assert_eq!(options.data_type, DataType::All);
    }

    #[test]
    fn test_subscribe_defaults() {
        let options = SubscribeOptions::default();
        assert_eq!(options.mode, StreamMode::Stream);
        assert_eq!(options.submode, SubscriptionMode::OnChange);
        assert_eq!(options.encoding, Encoding::Json);
        assert_eq!(options.qos, 0);
        assert!(!options.aggregate);
        assert!(!options.suppress);
        assert!(!options.use_alias);
        assert_eq!(options.interval, None);
        assert_eq!(options.heartbeat, None);
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn test_encoding_to_proto() {
        assert_eq!(Encoding::Json.to_proto(), 0);
        assert_eq!(Encoding::Bytes.to_proto(), 1);
        assert_eq!(Encoding::Proto.to_proto(), 2);
        assert_eq!(Encoding::Ascii.to_proto(), 3);
        assert_eq!(Encoding::JsonIetf.to_proto(), 4);
    }

    #[test]
    fn test_mode_tables() {
        assert_eq!(DataType::All.to_proto(), 0);
        assert_eq!(DataType::Operational.to_proto(), 3);
        assert_eq!(StreamMode::Stream.to_proto(), 0);
        assert_eq!(StreamMode::Poll.to_proto(), 2);
        assert_eq!(SubscriptionMode::TargetDefined.to_proto(), 0);
        assert_eq!(SubscriptionMode::OnChange.to_proto(), 1);
        assert_eq!(SubscriptionMode::Sample.to_proto(), 2);
    }

    #[test]
    fn test_from_str_normalizes() {
        assert_eq!("JSON_IETF".parse::<Encoding>().unwrap(), Encoding::JsonIetf);
        assert_eq!("json-ietf".parse::<Encoding>().unwrap(), Encoding::JsonIetf);
        assert_eq!(
            "on-change".parse::<SubscriptionMode>().unwrap(),
            SubscriptionMode::OnChange
        );
        assert_eq!("ONCE".parse::<StreamMode>().unwrap(), StreamMode::Once);
        assert_eq!("state".parse::<DataType>().unwrap(), DataType::State);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "cbor".parse::<Encoding>().unwrap_err();
        assert_eq!(err.field, "encoding");
        assert_eq!(err.value, "cbor");
        assert!("forever".parse::<StreamMode>().is_err());
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let parsed: Result<GetOptions, _> =
            serde_json::from_str(r#"{"encoding": "ASCII", "color": "red"}"#);
        assert!(parsed.is_err());

        let parsed: GetOptions = serde_json::from_str(r#"{"type": "STATE"}"#).unwrap();
        assert_eq!(parsed.data_type, DataType::State);
        assert_eq!(parsed.encoding, Encoding::Json);
    }
}
