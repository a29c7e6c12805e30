//! Integration tests for the gnmi client library.
//!
//! No live target is involved. Requests are checked by encoding and
//! decoding them through prost, responses by driving the stream adapters
//! over synthetic feeds.

use prost::Message;
use tokio_stream::StreamExt;
use tonic::Status;

use gnmi::proto;
use gnmi::proto::subscribe_response::Response;
use gnmi::proto::typed_value::Value as Typed;
use gnmi::{
    Encoding, Error, GetOptions, Path, PathValues, StreamMode, SubscribeOptions,
    SubscriptionMode, SubscriptionStream, Value, request,
};

fn update(path: &str, value: Typed) -> proto::Update {
    proto::Update {
        path: Some(path.parse::<Path>().expect("update path").to_proto()),
        val: Some(proto::TypedValue { value: Some(value) }),
        ..Default::default()
    }
}

fn notification(prefix: Option<&str>, updates: Vec<proto::Update>) -> proto::SubscribeResponse {
    proto::SubscribeResponse {
        response: Some(Response::Update(proto::Notification {
            timestamp: 1_700_000_000_000_000_000,
            prefix: prefix.map(|p| p.parse::<Path>().expect("prefix").to_proto()),
            update: updates,
            ..Default::default()
        })),
    }
}

fn sync_marker() -> proto::SubscribeResponse {
    proto::SubscribeResponse {
        response: Some(Response::SyncResponse(true)),
    }
}

#[test]
fn test_subscribe_request_survives_the_wire() {
    let paths = vec![
        "/interfaces/interface[name=Ethernet1]/state/counters"
            .parse::<Path>()
            .unwrap(),
    ];
    let options = SubscribeOptions {
        mode: StreamMode::Stream,
        submode: SubscriptionMode::Sample,
        encoding: Encoding::JsonIetf,
        interval: Some(10_000_000_000),
        ..Default::default()
    };

    let request = request::build_subscribe(&paths, &options).expect("build");

    // Through prost and back
    let bytes = request.encode_to_vec();
    let decoded = proto::SubscribeRequest::decode(bytes.as_slice()).expect("decode");

    let Some(proto::subscribe_request::Request::Subscribe(list)) = decoded.request else {
        panic!("expected subscribe variant");
    };
    assert_eq!(list.mode, proto::subscription_list::Mode::Stream as i32);
    assert_eq!(list.encoding, proto::Encoding::JsonIetf as i32);
    assert_eq!(list.subscription.len(), 1);

    let subscription = &list.subscription[0];
    assert_eq!(subscription.mode, proto::SubscriptionMode::Sample as i32);
    assert_eq!(subscription.sample_interval, 10_000_000_000);

    let path = subscription.path.as_ref().expect("path");
    assert_eq!(path.elem.len(), 4);
    assert_eq!(path.elem[1].name, "interface");
    assert_eq!(path.elem[1].key.get("name"), Some(&"Ethernet1".to_string()));
}

#[test]
fn test_get_request_survives_the_wire() {
    let paths = vec!["/system/state/hostname".parse::<Path>().unwrap()];
    let options = GetOptions {
        prefix: Some("openconfig:/".to_string()),
        ..Default::default()
    };

    let request = request::build_get(&paths, &options).expect("build");
    let bytes = request.encode_to_vec();
    let decoded = proto::GetRequest::decode(bytes.as_slice()).expect("decode");

    assert_eq!(decoded.prefix.expect("prefix").origin, "openconfig");
    assert_eq!(decoded.path.len(), 1);
    assert_eq!(decoded.path[0].elem.len(), 3);
    assert_eq!(decoded.r#type, proto::get_request::DataType::All as i32);
}

#[test]
fn test_get_response_flattens_against_prefix() {
    let response = proto::GetResponse {
        notification: vec![proto::Notification {
            timestamp: 42,
            prefix: Some(
                "openconfig:/interfaces/interface[name=Ethernet1]"
                    .parse::<Path>()
                    .unwrap()
                    .to_proto(),
            ),
            update: vec![
                update("state/oper-status", Typed::StringVal("UP".to_string())),
                update("state/counters/in-octets", Typed::UintVal(1234)),
            ],
            ..Default::default()
        }],
    };

    let pairs: Vec<_> = gnmi::GetResponse::from(response).into_pairs().collect();

    assert_eq!(pairs.len(), 2);
    // Origins never appear in flattened paths
    assert_eq!(
        pairs[0].0,
        "/interfaces/interface[name=Ethernet1]/state/oper-status"
    );
    assert_eq!(pairs[0].1, Some(Value::String("UP".to_string())));
    assert_eq!(
        pairs[1].0,
        "/interfaces/interface[name=Ethernet1]/state/counters/in-octets"
    );
    assert_eq!(pairs[1].1, Some(Value::Uint(1234)));
}

#[tokio::test]
async fn test_subscription_pipeline_discards_sync_markers() {
    let feed: Vec<Result<proto::SubscribeResponse, Status>> = vec![
        Ok(notification(
            Some("/interfaces/interface[name=Ethernet1]"),
            vec![update("state/oper-status", Typed::StringVal("UP".to_string()))],
        )),
        Ok(sync_marker()),
        Ok(notification(
            None,
            vec![
                update("/system/state/hostname", Typed::StringVal("edge1".to_string())),
                update("/system/state/boot-time", Typed::IntVal(1_700_000_000)),
            ],
        )),
        Ok(sync_marker()),
    ];

    let mut stream = PathValues::new(SubscriptionStream::new(tokio_stream::iter(feed)));

    let mut pairs = Vec::new();
    while let Some(item) = stream.next().await {
        pairs.push(item.expect("stream item"));
    }

    assert_eq!(
        pairs,
        vec![
            (
                "/interfaces/interface[name=Ethernet1]/state/oper-status".to_string(),
                Some(Value::String("UP".to_string())),
            ),
            (
                "/system/state/hostname".to_string(),
                Some(Value::String("edge1".to_string())),
            ),
            (
                "/system/state/boot-time".to_string(),
                Some(Value::Int(1_700_000_000)),
            ),
        ]
    );
}

#[tokio::test]
async fn test_deadline_ends_path_values_quietly() {
    let feed: Vec<Result<proto::SubscribeResponse, Status>> = vec![
        Ok(notification(
            None,
            vec![update("/system/state/hostname", Typed::StringVal("edge1".to_string()))],
        )),
        Err(Status::deadline_exceeded("deadline expired")),
    ];

    let mut stream = PathValues::new(SubscriptionStream::new(tokio_stream::iter(feed)));

    let first = stream.next().await.expect("first item").expect("first pair");
    assert_eq!(first.0, "/system/state/hostname");

    // The deadline is the normal end of a timed subscription
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_deadline_still_visible_on_raw_stream() {
    let feed: Vec<Result<proto::SubscribeResponse, Status>> =
        vec![Err(Status::deadline_exceeded("deadline expired"))];

    let mut stream = SubscriptionStream::new(tokio_stream::iter(feed));

    let err = stream.next().await.expect("item").expect_err("error");
    assert!(matches!(err, Error::DeadlineExceeded(_)));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_in_band_error_fails_the_pipeline() {
    let feed: Vec<Result<proto::SubscribeResponse, Status>> = vec![
        Ok(proto::SubscribeResponse {
            response: Some(Response::Error(proto::Error {
                code: 13,
                message: "backend gone".to_string(),
                ..Default::default()
            })),
        }),
        Ok(notification(
            None,
            vec![update("/never/seen", Typed::BoolVal(true))],
        )),
    ];

    let mut stream = PathValues::new(SubscriptionStream::new(tokio_stream::iter(feed)));

    let err = stream.next().await.expect("item").expect_err("error");
    assert!(matches!(err, Error::ProtocolViolation(_)));
    // Fused after the failure, the later update never surfaces
    assert!(stream.next().await.is_none());
}

#[test]
fn test_capabilities_view_over_decoded_response() {
    let response = proto::CapabilityResponse {
        supported_models: vec![proto::ModelData {
            name: "openconfig-interfaces".to_string(),
            organization: "OpenConfig working group".to_string(),
            version: "2.4.1".to_string(),
        }],
        supported_encodings: vec![
            proto::Encoding::Json as i32,
            proto::Encoding::JsonIetf as i32,
        ],
        gnmi_version: "0.7.0".to_string(),
    };

    let bytes = response.encode_to_vec();
    let decoded = proto::CapabilityResponse::decode(bytes.as_slice()).expect("decode");

    let view = gnmi::CapabilitiesResponse::from(decoded);
    assert_eq!(view.version(), "0.7.0");
    assert_eq!(view.encodings(), &[0, 4]);

    let models: Vec<_> = view.models().collect();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name(), "openconfig-interfaces");
    assert_eq!(models[0].version(), "2.4.1");
}

#[test]
fn test_path_text_proto_text_round_trip() {
    let text = r"openconfig:/interfaces/interface[name=Ethernet1][subinterface=0]/rates\/5min";

    let parsed: Path = text.parse().expect("parse");
    assert_eq!(parsed.elements[2].name, "rates/5min");

    let reconstructed = Path::from_proto(&parsed.to_proto());

    // Keys come back sorted by name; this path is already in that order
    assert_eq!(reconstructed.to_string(), text);
}
