//! Read-only views over response messages.
//!
//! Views borrow the underlying message and decode on access; nothing is
//! cached or mutated. Update paths are relative to their notification's
//! prefix, so fully-qualified addressing concatenates the two.

use std::fmt;

use gnmi_proto as pb;

use crate::path::Path;

/// Decoded update payload. Exactly one wire value kind is populated per
/// update; this is the decoded form of whichever kind that was.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
    Bytes(Vec<u8>),
    Float(f64),
    Json(serde_json::Value),
    List(Vec<Value>),
    /// Payload this client does not interpret (protobuf or legacy bytes).
    Opaque(Vec<u8>),
}

impl Value {
    /// Decodes whichever kind of the wire value is populated, or `None`
    /// when the target sent an empty value.
    pub fn from_typed(value: &pb::TypedValue) -> Option<Value> {
        use pb::typed_value::Value as Typed;

        match value.value.as_ref()? {
            Typed::StringVal(s) => Some(Value::String(s.clone())),
            Typed::IntVal(i) => Some(Value::Int(*i)),
            Typed::UintVal(u) => Some(Value::Uint(*u)),
            Typed::BoolVal(b) => Some(Value::Bool(*b)),
            Typed::BytesVal(b) => Some(Value::Bytes(b.clone())),
            Typed::FloatVal(f) => Some(Value::Float(f64::from(*f))),
            Typed::DoubleVal(d) => Some(Value::Float(*d)),
            Typed::DecimalVal(d) => {
                Some(Value::Float(d.digits as f64 * 10f64.powi(-(d.precision as i32))))
            }
            Typed::LeaflistVal(list) => Some(Value::List(
                list.element.iter().filter_map(Value::from_typed).collect(),
            )),
            Typed::AnyVal(any) => Some(Value::Opaque(any.value.clone())),
            Typed::JsonVal(raw) | Typed::JsonIetfVal(raw) => Some(decode_json(raw)),
            Typed::AsciiVal(s) => Some(Value::String(s.clone())),
            Typed::ProtoBytes(raw) => Some(Value::Opaque(raw.clone())),
        }
    }
}

/// Structured when the payload parses as JSON, lossy text otherwise.
fn decode_json(raw: &[u8]) -> Value {
    match serde_json::from_slice(raw) {
        Ok(json) => Value::Json(json),
        Err(_) => Value::String(String::from_utf8_lossy(raw).into_owned()),
    }
}

fn update_value(update: &pb::Update) -> Option<Value> {
    if let Some(val) = &update.val {
        return Value::from_typed(val);
    }
    // Some targets still populate the pre-typed-value field.
    #[allow(deprecated)]
    let legacy = update.value.as_ref();
    legacy.map(|value| Value::Opaque(value.value.clone()))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Json(json) => write!(f, "{json}"),
            Value::Bytes(bytes) | Value::Opaque(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Result of a capabilities request.
#[derive(Debug, Clone)]
pub struct CapabilitiesResponse {
    inner: pb::CapabilityResponse,
}

impl From<pb::CapabilityResponse> for CapabilitiesResponse {
    fn from(inner: pb::CapabilityResponse) -> Self {
        Self { inner }
    }
}

impl CapabilitiesResponse {
    /// Supported schema models, in the order the target listed them.
    pub fn models(&self) -> impl Iterator<Item = Model<'_>> {
        self.inner
            .supported_models
            .iter()
            .map(|model| Model { inner: model })
    }

    /// Supported encodings as raw wire codes. Codes are not mapped back to
    /// the symbolic names accepted on input.
    pub fn encodings(&self) -> &[i32] {
        &self.inner.supported_encodings
    }

    pub fn version(&self) -> &str {
        &self.inner.gnmi_version
    }

    pub fn into_inner(self) -> pb::CapabilityResponse {
        self.inner
    }
}

/// One supported schema model.
#[derive(Debug, Clone, Copy)]
pub struct Model<'a> {
    inner: &'a pb::ModelData,
}

impl<'a> Model<'a> {
    pub fn name(self) -> &'a str {
        &self.inner.name
    }

    pub fn organization(self) -> &'a str {
        &self.inner.organization
    }

    pub fn version(self) -> &'a str {
        &self.inner.version
    }
}

/// Result of a get request: notifications in received order, never merged.
#[derive(Debug, Clone)]
pub struct GetResponse {
    inner: pb::GetResponse,
}

impl From<pb::GetResponse> for GetResponse {
    fn from(inner: pb::GetResponse) -> Self {
        Self { inner }
    }
}

impl GetResponse {
    pub fn notifications(&self) -> impl Iterator<Item = Notification<'_>> {
        self.inner
            .notification
            .iter()
            .map(|notification| Notification {
                inner: notification,
            })
    }

    /// Flattens every update to a `(fully-qualified path, value)` pair by
    /// concatenating each notification's prefix with the update path.
    pub fn into_pairs(self) -> impl Iterator<Item = (String, Option<Value>)> {
        self.inner.notification.into_iter().flat_map(|notification| {
            let prefix = notification
                .prefix
                .as_ref()
                .map(Path::from_proto)
                .unwrap_or_default();
            notification.update.into_iter().map(move |update| {
                let path = update
                    .path
                    .as_ref()
                    .map(Path::from_proto)
                    .unwrap_or_default();
                let value = update_value(&update);
                (prefix.concat(&path).to_string(), value)
            })
        })
    }

    pub fn into_inner(self) -> pb::GetResponse {
        self.inner
    }
}

/// View of one notification.
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a> {
    inner: &'a pb::Notification,
}

impl<'a> Notification<'a> {
    /// Target-reported nanoseconds since the Unix epoch, passed through
    /// without interpretation.
    pub fn timestamp(self) -> i64 {
        self.inner.timestamp
    }

    pub fn prefix(self) -> Path {
        self.inner
            .prefix
            .as_ref()
            .map(Path::from_proto)
            .unwrap_or_default()
    }

    /// Updates in received order. Paths are relative to [`Self::prefix`].
    pub fn updates(self) -> impl Iterator<Item = Update<'a>> {
        self.inner.update.iter().map(|update| Update { inner: update })
    }

    /// Paths whose data was deleted, relative to [`Self::prefix`].
    pub fn deletes(self) -> impl Iterator<Item = Path> + 'a {
        self.inner.delete.iter().map(Path::from_proto)
    }

    pub fn atomic(self) -> bool {
        self.inner.atomic
    }
}

/// View of one update within a notification.
#[derive(Debug, Clone, Copy)]
pub struct Update<'a> {
    inner: &'a pb::Update,
}

impl Update<'_> {
    /// Path relative to the owning notification's prefix.
    pub fn path(self) -> Path {
        self.inner
            .path
            .as_ref()
            .map(Path::from_proto)
            .unwrap_or_default()
    }

    pub fn value(self) -> Option<Value> {
        update_value(self.inner)
    }

    pub fn duplicates(self) -> u32 {
        self.inner.duplicates
    }
}

/// One inbound subscription message: a single notification, unlike the
/// sequence a get returns.
#[derive(Debug, Clone)]
pub struct SubscribeResponse {
    inner: pb::Notification,
}

impl From<pb::Notification> for SubscribeResponse {
    fn from(inner: pb::Notification) -> Self {
        Self { inner }
    }
}

impl SubscribeResponse {
    pub fn update(&self) -> Notification<'_> {
        Notification { inner: &self.inner }
    }

    pub fn into_inner(self) -> pb::Notification {
        self.inner
    }
}
