//! Network layer - request building, execution and in-flight tracking
//!
//! The Network actor receives HTTP commands and sends back normalized responses.

pub mod actor;
pub mod builder;
pub mod client;
pub mod params;
pub mod registry;

pub use actor::NetworkActor;
pub use builder::{build_request, BuiltRequest, RequestBuilder};
pub use registry::RequestRegistry;
