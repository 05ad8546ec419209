use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Deserialize};
use crate::clock::Clock;

/// One published network endpoint of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Transport token as reported by the runtime, e.g. "tcp"
    #[serde(rename = "type")]
    pub port_type: String,

    /// Externally reachable port (0 when the container port is not published)
    pub port: u16,

    /// Logical port consumers address the service by (0 when none declared)
    pub service_port: u16,

    /// Address on which `port` is reachable
    pub ip: String,
}

/// Registry lifecycle state of a service.
/// The core only ever assigns `UNKNOWN`; registry consumers give meaning to other values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceStatus(pub u8);

impl ServiceStatus {
    pub const UNKNOWN: ServiceStatus = ServiceStatus(0);
}

/// A registry record for one running container.
/// This is the canonical data model shared by the builder, the registry, and the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Short container id
    pub id: String,

    /// First runtime name of the container, e.g. "/sample-app"
    pub name: String,

    /// Image reference the container was started from
    pub image: String,

    /// Container creation time
    pub created: DateTime<Utc>,

    /// Hostname of the agent that built this record
    pub hostname: String,

    /// Published ports, in runtime order
    pub ports: Vec<Port>,

    pub proxy_mode: String,
    pub health_check: String,
    pub health_check_args: String,

    pub status: ServiceStatus,

    /// Last time this record was rebuilt
    pub updated: DateTime<Utc>,
}

impl Service {
    /// Find the published port serving `service_port` over `port_type`.
    /// The first matching entry wins when a service declares duplicates.
    pub fn port_for_service_port(&self, service_port: u16, port_type: &str) -> Option<u16> {
        self.ports
            .iter()
            .find(|p| p.service_port == service_port && p.port_type == port_type)
            .map(|p| p.port)
    }

    /// Same lookup as `port_for_service_port`, with -1 for no match.
    pub fn legacy_port_for_service_port(&self, service_port: u16, port_type: &str) -> i32 {
        self.port_for_service_port(service_port, port_type)
            .map(i32::from)
            .unwrap_or(-1)
    }

    /// Whether this record has gone without a refresh for longer than `lifespan`.
    pub fn is_stale(&self, lifespan: Duration, clock: &impl Clock) -> bool {
        self.is_stale_at(lifespan, clock.now())
    }

    /// Staleness relative to an explicit `now`. A record exactly `lifespan` old is still fresh.
    pub fn is_stale_at(&self, lifespan: Duration, now: DateTime<Utc>) -> bool {
        now - self.updated > lifespan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(port_type: &str, port: u16, service_port: u16) -> Port {
        Port {
            port_type: port_type.to_string(),
            port,
            service_port,
            ip: "127.0.0.1".to_string(),
        }
    }

    fn test_service(updated: DateTime<Utc>) -> Service {
        Service {
            id: "deadbeef001".to_string(),
            name: "hrunting".to_string(),
            image: String::new(),
            created: DateTime::<Utc>::default(),
            hostname: "beowulf".to_string(),
            ports: vec![port("tcp", 8173, 8080), port("udp", 8172, 8080)],
            proxy_mode: String::new(),
            health_check: String::new(),
            health_check_args: String::new(),
            status: ServiceStatus::default(),
            updated,
        }
    }

    #[test]
    fn test_port_for_service_port_matches_type() {
        let svc = test_service(Utc::now());

        assert_eq!(svc.port_for_service_port(8080, "tcp"), Some(8173));
        assert_eq!(svc.port_for_service_port(8080, "udp"), Some(8172));
    }

    #[test]
    fn test_port_for_service_port_no_match() {
        let svc = test_service(Utc::now());

        assert_eq!(svc.port_for_service_port(8090, "tcp"), None);
        assert_eq!(svc.port_for_service_port(8080, "TCP"), None, "Type match is case-sensitive");
        assert_eq!(svc.legacy_port_for_service_port(8090, "tcp"), -1);
        assert_eq!(svc.legacy_port_for_service_port(8080, "tcp"), 8173);
    }

    #[test]
    fn test_port_for_service_port_first_match_wins() {
        let mut svc = test_service(Utc::now());
        svc.ports.push(port("tcp", 9999, 8080));

        assert_eq!(svc.port_for_service_port(8080, "tcp"), Some(8173));
    }

    #[test]
    fn test_is_stale() {
        let now = Utc::now();
        let lifespan = Duration::hours(1);

        let svc = test_service(now - lifespan - Duration::minutes(2));
        assert!(svc.is_stale(lifespan, &now));

        let svc = test_service(now - lifespan);
        assert!(!svc.is_stale(Duration::minutes(62), &now));
    }

    #[test]
    fn test_is_stale_boundary_is_fresh() {
        let now = Utc::now();
        let lifespan = Duration::seconds(80);

        let svc = test_service(now - lifespan);
        assert!(!svc.is_stale_at(lifespan, now));

        let svc = test_service(now - lifespan - Duration::milliseconds(1));
        assert!(svc.is_stale_at(lifespan, now));
    }

    #[test]
    fn test_status_serializes_as_integer() {
        let svc = test_service(Utc::now());
        let json = serde_json::to_value(&svc).unwrap();

        assert_eq!(json["status"], 0);
        assert_eq!(json["ports"][0]["type"], "tcp");
    }
}
