use std::collections::HashMap;
use chrono::Duration;
use shared::clock::Clock;
use shared::types::Service;

/// In-memory service records keyed by service id.
#[derive(Default)]
pub struct ServiceStore {
    services: HashMap<String, Service>,
}

impl ServiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh snapshot of a service. Returns true if its data changed.
    /// The snapshot always replaces the stored record so `updated` moves forward.
    pub fn upsert(&mut self, service: Service) -> bool {
        let changed = match self.services.get(&service.id) {
            Some(old) => service_data_changed(old, &service),
            None => true,
        };

        self.services.insert(service.id.clone(), service);
        changed
    }

    pub fn get(&self, id: &str) -> Option<Service> {
        self.services.get(id).cloned()
    }

    /// All services, sorted by id
    pub fn get_all(&self) -> Vec<Service> {
        let mut services: Vec<Service> = self.services.values().cloned().collect();
        services.sort_by(|a, b| a.id.cmp(&b.id));
        services
    }

    /// Published port for a service's logical port. `None` if the service is unknown.
    pub fn port_for(&self, id: &str, service_port: u16, port_type: &str) -> Option<Option<u16>> {
        self.services
            .get(id)
            .map(|s| s.port_for_service_port(service_port, port_type))
    }

    /// Remove every record not refreshed within `lifespan`. Returns the removed ids.
    pub fn evict_stale(&mut self, lifespan: Duration, clock: &impl Clock) -> Vec<String> {
        let now = clock.now();
        let mut evicted: Vec<String> = self
            .services
            .values()
            .filter(|s| s.is_stale_at(lifespan, now))
            .map(|s| s.id.clone())
            .collect();
        evicted.sort();

        for id in &evicted {
            self.services.remove(id);
        }

        evicted
    }
}

/// Compare the fields that describe the service, ignoring the refresh timestamp.
fn service_data_changed(old: &Service, new: &Service) -> bool {
    old.name != new.name
        || old.image != new.image
        || old.created != new.created
        || old.hostname != new.hostname
        || old.ports != new.ports
        || old.proxy_mode != new.proxy_mode
        || old.health_check != new.health_check
        || old.health_check_args != new.health_check_args
        || old.status != new.status
}
