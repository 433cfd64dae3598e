//! Presenton node: generate presentations, check their status and upload
//! source files through the Presenton HTTP API.

pub mod credentials;
pub mod mock;
pub mod node;
pub mod operation;
pub mod polling;
pub mod request;
pub mod transport;

pub use credentials::PresentonCredentials;
pub use node::PresentonNode;
pub use operation::Operation;
pub use polling::{poll_status, PollConfig, PollOutcome};
pub use request::GenerateRequest;
pub use transport::{FilePart, HttpTransport, HttpTransportConfig, Transport};
