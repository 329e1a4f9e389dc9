// gns3-api: Async object model for the GNS3 server v2 REST API
//
// Gns3Client -> Project -> Node (-> Link). Every resource holds the same
// `Arc<dyn Transport>` and issues its own requests scoped to its identity.

pub mod client;
pub mod error;
pub mod link;
pub mod models;
pub mod node;
pub mod project;
pub mod response;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::Gns3Client;
pub use error::Error;
pub use link::Link;
pub use models::{DEFAULT_COMPUTE_ID, LinkEndpoint, LinkInfo, NodeInfo, ProjectInfo};
pub use node::Node;
pub use project::Project;
pub use response::{ApiResponse, Method, Payload};
pub use transport::{
    ClientConfig, DEFAULT_PORT, HttpTransport, ServerAddress, TlsMode, Transport, TransportConfig,
};
