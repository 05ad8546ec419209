//! Canonical service records built from container runtime listings.

pub mod builder;
pub mod clock;
pub mod container;
pub mod labels;
pub mod protocol;
pub mod types;

pub use builder::{build_port, to_service, ServiceBuilder};
pub use clock::{Clock, HostnameProvider, SystemClock, SystemHostname};
pub use container::{ContainerDescriptor, PortDescriptor};
pub use types::{Port, Service, ServiceStatus};
