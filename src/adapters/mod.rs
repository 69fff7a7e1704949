// Concrete implementations of the domain ports and clients of external systems.

pub mod api_client;
pub mod memory;
pub mod rest_store;

pub use api_client::{AvailabilityClient, ClientReply};
pub use memory::MemoryStore;
pub use rest_store::RestStore;
