//! Message bindings for the `gnmi` protobuf package.
//!
//! Maintained by hand so the crate builds without `protoc`. Field numbers
//! follow `gnmi.proto`; fields this client neither sends nor reads (model
//! filters, extensions, alias machinery) are left unbound, which proto3
//! tolerates on both encode and decode.

use std::collections::HashMap;

/// A timestamped batch of updates sharing one path prefix.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Notification {
    /// Nanoseconds since the Unix epoch, as reported by the target.
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(message, optional, tag = "2")]
    pub prefix: Option<Path>,
    #[prost(message, repeated, tag = "4")]
    pub update: Vec<Update>,
    #[prost(message, repeated, tag = "5")]
    pub delete: Vec<Path>,
    #[prost(bool, tag = "6")]
    pub atomic: bool,
}

/// One (path, value) datum within a notification.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Update {
    #[prost(message, optional, tag = "1")]
    pub path: Option<Path>,
    #[deprecated]
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>,
    #[prost(message, optional, tag = "3")]
    pub val: Option<TypedValue>,
    #[prost(uint32, tag = "4")]
    pub duplicates: u32,
}

/// Value of an update, exactly one kind populated.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypedValue {
    #[prost(
        oneof = "typed_value::Value",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14"
    )]
    pub value: Option<typed_value::Value>,
}

pub mod typed_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "1")]
        StringVal(String),
        #[prost(int64, tag = "2")]
        IntVal(i64),
        #[prost(uint64, tag = "3")]
        UintVal(u64),
        #[prost(bool, tag = "4")]
        BoolVal(bool),
        #[prost(bytes, tag = "5")]
        BytesVal(Vec<u8>),
        #[prost(float, tag = "6")]
        FloatVal(f32),
        #[prost(message, tag = "7")]
        DecimalVal(super::Decimal64),
        #[prost(message, tag = "8")]
        LeaflistVal(super::ScalarArray),
        #[prost(message, tag = "9")]
        AnyVal(::prost_types::Any),
        #[prost(bytes, tag = "10")]
        JsonVal(Vec<u8>),
        #[prost(bytes, tag = "11")]
        JsonIetfVal(Vec<u8>),
        #[prost(string, tag = "12")]
        AsciiVal(String),
        #[prost(bytes, tag = "13")]
        ProtoBytes(Vec<u8>),
        #[prost(double, tag = "14")]
        DoubleVal(f64),
    }
}

/// Structured data-tree path.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Path {
    /// Pre-0.4 string elements, superseded by `elem`.
    #[deprecated]
    #[prost(string, repeated, tag = "1")]
    pub element: Vec<String>,
    #[prost(string, tag = "2")]
    pub origin: String,
    #[prost(message, repeated, tag = "3")]
    pub elem: Vec<PathElem>,
    #[prost(string, tag = "4")]
    pub target: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PathElem {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(map = "string, string", tag = "2")]
    pub key: HashMap<String, String>,
}

/// Pre-typed-value encoding of an update payload, kept for targets that
/// still populate `Update.value`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
    #[prost(enumeration = "Encoding", tag = "2")]
    pub r#type: i32,
}

/// In-band error some targets emit on the subscribe stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(uint32, tag = "1")]
    pub code: u32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, optional, tag = "3")]
    pub data: Option<::prost_types::Any>,
}

/// Base-10 decimal: `digits` scaled by 10^-`precision`.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Decimal64 {
    #[prost(int64, tag = "1")]
    pub digits: i64,
    #[prost(uint32, tag = "2")]
    pub precision: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScalarArray {
    #[prost(message, repeated, tag = "1")]
    pub element: Vec<TypedValue>,
}

/// Client-to-target message of the Subscribe RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeRequest {
    #[prost(oneof = "subscribe_request::Request", tags = "1, 3")]
    pub request: Option<subscribe_request::Request>,
}

pub mod subscribe_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        Subscribe(super::SubscriptionList),
        #[prost(message, tag = "3")]
        Poll(super::Poll),
    }
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Poll {}

/// Target-to-client message of the Subscribe RPC.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeResponse {
    #[prost(oneof = "subscribe_response::Response", tags = "1, 3, 4")]
    pub response: Option<subscribe_response::Response>,
}

pub mod subscribe_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        #[prost(message, tag = "1")]
        Update(super::Notification),
        /// Marks the end of the initial snapshot.
        #[prost(bool, tag = "3")]
        SyncResponse(bool),
        #[prost(message, tag = "4")]
        Error(super::Error),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscriptionList {
    #[prost(message, optional, tag = "1")]
    pub prefix: Option<Path>,
    #[prost(message, repeated, tag = "2")]
    pub subscription: Vec<Subscription>,
    #[prost(bool, tag = "3")]
    pub use_aliases: bool,
    #[prost(message, optional, tag = "4")]
    pub qos: Option<QosMarking>,
    #[prost(enumeration = "subscription_list::Mode", tag = "5")]
    pub mode: i32,
    #[prost(bool, tag = "6")]
    pub allow_aggregation: bool,
    #[prost(enumeration = "Encoding", tag = "8")]
    pub encoding: i32,
}

pub mod subscription_list {
    /// How the set of subscriptions is delivered.
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Mode {
        Stream = 0,
        Once = 1,
        Poll = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Subscription {
    #[prost(message, optional, tag = "1")]
    pub path: Option<Path>,
    #[prost(enumeration = "SubscriptionMode", tag = "2")]
    pub mode: i32,
    /// Nanoseconds between samples in `Sample` mode.
    #[prost(uint64, tag = "3")]
    pub sample_interval: u64,
    #[prost(bool, tag = "4")]
    pub suppress_redundant: bool,
    /// Maximum nanoseconds of silence before a value is re-sent.
    #[prost(uint64, tag = "5")]
    pub heartbeat_interval: u64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct QosMarking {
    #[prost(uint32, tag = "1")]
    pub marking: u32,
}

/// Trigger policy for a single subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SubscriptionMode {
    TargetDefined = 0,
    OnChange = 1,
    Sample = 2,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct CapabilityRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CapabilityResponse {
    #[prost(message, repeated, tag = "1")]
    pub supported_models: Vec<ModelData>,
    #[prost(enumeration = "Encoding", repeated, tag = "2")]
    pub supported_encodings: Vec<i32>,
    #[prost(string, tag = "3")]
    pub gnmi_version: String,
}

/// One supported schema module.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModelData {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub organization: String,
    #[prost(string, tag = "3")]
    pub version: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRequest {
    #[prost(message, optional, tag = "1")]
    pub prefix: Option<Path>,
    #[prost(message, repeated, tag = "2")]
    pub path: Vec<Path>,
    #[prost(enumeration = "get_request::DataType", tag = "3")]
    pub r#type: i32,
    #[prost(enumeration = "Encoding", tag = "5")]
    pub encoding: i32,
}

pub mod get_request {
    /// Class of data to retrieve.
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum DataType {
        All = 0,
        Config = 1,
        State = 2,
        Operational = 3,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResponse {
    #[prost(message, repeated, tag = "1")]
    pub notification: Vec<Notification>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetRequest {
    #[prost(message, optional, tag = "1")]
    pub prefix: Option<Path>,
    #[prost(message, repeated, tag = "2")]
    pub delete: Vec<Path>,
    #[prost(message, repeated, tag = "3")]
    pub replace: Vec<Update>,
    #[prost(message, repeated, tag = "4")]
    pub update: Vec<Update>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetResponse {
    #[prost(message, optional, tag = "1")]
    pub prefix: Option<Path>,
    #[prost(message, repeated, tag = "2")]
    pub response: Vec<UpdateResult>,
    #[prost(int64, tag = "4")]
    pub timestamp: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateResult {
    #[prost(message, optional, tag = "2")]
    pub path: Option<Path>,
    #[prost(enumeration = "update_result::Operation", tag = "4")]
    pub op: i32,
}

pub mod update_result {
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Operation {
        Invalid = 0,
        Delete = 1,
        Replace = 2,
        Update = 3,
    }
}

/// Serialization used for value payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Encoding {
    Json = 0,
    Bytes = 1,
    Proto = 2,
    Ascii = 3,
    JsonIetf = 4,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_subscribe_request_round_trip() {
        let request = SubscribeRequest {
            request: Some(subscribe_request::Request::Subscribe(SubscriptionList {
                prefix: Some(Path {
                    origin: "sys".to_string(),
                    elem: vec![PathElem {
                        name: "interfaces".to_string(),
                        key: HashMap::new(),
                    }],
                    ..Default::default()
                }),
                subscription: vec![Subscription {
                    path: Some(Path {
                        elem: vec![PathElem {
                            name: "interface".to_string(),
                            key: [("name".to_string(), "Ethernet1".to_string())]
                                .into_iter()
                                .collect(),
                        }],
                        ..Default::default()
                    }),
                    mode: SubscriptionMode::Sample as i32,
                    sample_interval: 1_000_000_000,
                    suppress_redundant: true,
                    heartbeat_interval: 0,
                }],
                use_aliases: false,
                qos: Some(QosMarking { marking: 10 }),
                mode: subscription_list::Mode::Stream as i32,
                allow_aggregation: false,
                encoding: Encoding::JsonIetf as i32,
            })),
        };

        let decoded = SubscribeRequest::decode(request.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, request);

        let Some(subscribe_request::Request::Subscribe(list)) = decoded.request else {
            panic!("subscribe arm lost in round trip");
        };
        assert_eq!(list.subscription.len(), 1);
        assert_eq!(list.encoding, 4);
        assert_eq!(list.subscription[0].mode, 2);
    }

    #[test]
    fn test_typed_value_oneof_tags() {
        let value = TypedValue {
            value: Some(typed_value::Value::DecimalVal(Decimal64 {
                digits: 1234,
                precision: 2,
            })),
        };
        let decoded = TypedValue::decode(value.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, value);
    }
}
