//! Protocol buffer and gRPC bindings for gNMI, the gRPC Network Management
//! Interface.
//!
//! Message types live at the crate root under their protobuf names
//! (oneof arms in nested modules, e.g. [`subscribe_response::Response`]);
//! [`client::GnmiClient`] drives the four service methods over a connected
//! [`tonic::transport::Channel`].

pub mod client;
mod gnmi;

pub use gnmi::*;
