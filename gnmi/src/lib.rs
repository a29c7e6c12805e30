//! Client-side gNMI.
//!
//! The crate is organised in layers. [`path`] implements the textual path
//! notation and its protobuf mapping, [`request`] assembles outgoing
//! messages from [`options`], [`response`] and [`stream`] reshape what
//! comes back, and [`session`] owns the channel that carries it all.
//! The [`api`] functions bundle those layers into single calls for the
//! common dial-once cases, and the raw generated bindings stay reachable
//! through [`proto`] for anything the typed surface does not cover.

pub mod api;
pub mod error;
pub mod options;
pub mod path;
pub mod request;
pub mod response;
pub mod session;
pub mod stream;

pub use gnmi_proto as proto;

pub use api::{capabilities, delete, get, replace, subscribe, update};
pub use error::{Error, Result, RpcStatus};
pub use options::{
    CertificateStore, ConnectOptions, Credentials, DataType, Encoding, GetOptions, StreamMode,
    SubscribeOptions, SubscriptionMode,
};
pub use path::{IntoPath, Path, PathElem, PathParseError};
pub use response::{CapabilitiesResponse, GetResponse, SubscribeResponse, Value};
pub use session::{DEFAULT_PORT, Session, Target};
pub use stream::{PathValues, SubscriptionStream};
