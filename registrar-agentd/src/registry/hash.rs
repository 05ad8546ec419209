use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Sha256, Digest};
use shared::types::{Port, Service, ServiceStatus};

/// Stable fields only: `updated` moves on every refresh without the service changing.
#[derive(Serialize)]
struct HashView<'a> {
    id: &'a str,
    name: &'a str,
    image: &'a str,
    created: DateTime<Utc>,
    hostname: &'a str,
    ports: &'a [Port],
    proxy_mode: &'a str,
    health_check: &'a str,
    health_check_args: &'a str,
    status: ServiceStatus,
}

/// Computes a SHA-256 hash of the service list.
/// Services are sorted by id for deterministic output.
pub fn compute_hash(services: &[Service]) -> String {
    let mut indices: Vec<usize> = (0..services.len()).collect();
    indices.sort_by(|&a, &b| services[a].id.cmp(&services[b].id));

    let mut hasher = Sha256::new();
    for &i in &indices {
        let s = &services[i];
        let view = HashView {
            id: &s.id,
            name: &s.name,
            image: &s.image,
            created: s.created,
            hostname: &s.hostname,
            ports: &s.ports,
            proxy_mode: &s.proxy_mode,
            health_check: &s.health_check,
            health_check_args: &s.health_check_args,
            status: s.status,
        };

        // Serializing plain strings, integers and timestamps cannot fail
        if let Ok(json) = serde_json::to_vec(&view) {
            hasher.update(&json);
            hasher.update(b"\n");
        }
    }

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(id: &str) -> Service {
        Service {
            id: id.to_string(),
            name: "/sample-app".to_string(),
            image: "example.com/app:latest".to_string(),
            created: DateTime::from_timestamp(1457144774, 0).unwrap(),
            hostname: "beowulf".to_string(),
            ports: vec![Port {
                port_type: "tcp".to_string(),
                port: 31355,
                service_port: 17010,
                ip: "192.168.77.13".to_string(),
            }],
            proxy_mode: "tcp".to_string(),
            health_check: String::new(),
            health_check_args: String::new(),
            status: ServiceStatus::UNKNOWN,
            updated: Utc::now(),
        }
    }

    #[test]
    fn test_hash_deterministic() {
        let service1 = test_service("aaaaaaaaaaaa");
        let service2 = test_service("bbbbbbbbbbbb");

        let hash1 = compute_hash(&[service1.clone(), service2.clone()]);
        let hash2 = compute_hash(&[service2, service1]);

        assert_eq!(hash1, hash2, "Hash should be same regardless of input order");
    }

    #[test]
    fn test_hash_changes_on_modification() {
        let service1 = test_service("aaaaaaaaaaaa");
        let mut service2 = test_service("aaaaaaaaaaaa");

        let hash1 = compute_hash(&[service1]);

        service2.ports[0].service_port = 17011;
        let hash2 = compute_hash(&[service2]);

        assert_ne!(hash1, hash2, "Hash should change when a service changes");
    }

    #[test]
    fn test_hash_stable_across_refresh() {
        let service1 = test_service("aaaaaaaaaaaa");
        let mut service2 = test_service("aaaaaaaaaaaa");
        service2.updated = service1.updated + chrono::Duration::seconds(60);

        assert_eq!(
            compute_hash(&[service1]),
            compute_hash(&[service2]),
            "Hash should not change when only the refresh time changes"
        );
    }
}
