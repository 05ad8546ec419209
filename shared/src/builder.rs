use std::collections::HashMap;
use chrono::{DateTime, Utc};
use crate::clock::{Clock, HostnameProvider, SystemClock, SystemHostname};
use crate::container::{ContainerDescriptor, PortDescriptor};
use crate::labels::{self, ServiceLabels};
use crate::protocol::SHORT_ID_LEN;
use crate::types::{Port, Service, ServiceStatus};

/// Convert one runtime port entry into a `Port`, resolving its logical port from `labels`.
pub fn build_port(
    descriptor: &PortDescriptor,
    labels: &HashMap<String, String>,
    default_ip: &str,
) -> Port {
    let ip = if descriptor.ip.is_empty() {
        default_ip.to_string()
    } else {
        descriptor.ip.clone()
    };

    Port {
        port_type: descriptor.port_type.clone(),
        port: descriptor.public_port,
        service_port: labels::service_port_for(labels, descriptor.private_port),
        ip,
    }
}

/// Builds `Service` records for containers on this host.
pub struct ServiceBuilder<C = SystemClock, H = SystemHostname> {
    default_ip: String,
    clock: C,
    hostname: H,
}

impl ServiceBuilder {
    /// Builder reading the system clock and hostname.
    /// `default_ip` is used for ports the runtime reports without an address.
    pub fn new(default_ip: impl Into<String>) -> Self {
        Self {
            default_ip: default_ip.into(),
            clock: SystemClock,
            hostname: SystemHostname,
        }
    }
}

impl<C: Clock, H: HostnameProvider> ServiceBuilder<C, H> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ServiceBuilder<C2, H> {
        ServiceBuilder {
            default_ip: self.default_ip,
            clock,
            hostname: self.hostname,
        }
    }

    pub fn with_hostname<H2: HostnameProvider>(self, hostname: H2) -> ServiceBuilder<C, H2> {
        ServiceBuilder {
            default_ip: self.default_ip,
            clock: self.clock,
            hostname,
        }
    }

    /// Build a fresh record for `container`, stamped with the current time.
    pub fn build(&self, container: &ContainerDescriptor) -> Service {
        let config = ServiceLabels::from_labels(&container.labels);

        let ports = container
            .ports
            .iter()
            .map(|p| build_port(p, &container.labels, &self.default_ip))
            .collect();

        Service {
            id: short_id(&container.id).to_string(),
            name: container.names.first().cloned().unwrap_or_default(),
            image: container.image.clone(),
            created: created_at(container.created),
            hostname: self.hostname.hostname(),
            ports,
            proxy_mode: config.proxy_mode,
            health_check: config.health_check,
            health_check_args: config.health_check_args,
            status: ServiceStatus::UNKNOWN,
            updated: self.clock.now(),
        }
    }
}

/// Build a record for `container` using the system clock and hostname.
pub fn to_service(container: &ContainerDescriptor, default_ip: &str) -> Service {
    ServiceBuilder::new(default_ip).build(container)
}

/// First `SHORT_ID_LEN` characters of `id`, or all of it when shorter
fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Out-of-range timestamps fall back to the Unix epoch
fn created_at(epoch_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch_secs, 0).unwrap_or_default()
}
