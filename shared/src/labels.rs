use std::collections::HashMap;
use crate::protocol::{
    LABEL_HEALTH_CHECK, LABEL_HEALTH_CHECK_ARGS, LABEL_PROXY_MODE, LABEL_SERVICE_PORT_PREFIX,
};

/// Service-level settings read from container labels.
/// Missing labels read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceLabels {
    pub proxy_mode: String,
    pub health_check: String,
    pub health_check_args: String,
}

impl ServiceLabels {
    pub fn from_labels(labels: &HashMap<String, String>) -> Self {
        let get = |key: &str| labels.get(key).cloned().unwrap_or_default();

        Self {
            proxy_mode: get(LABEL_PROXY_MODE),
            health_check: get(LABEL_HEALTH_CHECK),
            health_check_args: get(LABEL_HEALTH_CHECK_ARGS),
        }
    }
}

/// Logical port declared for `private_port`, or 0 when the label is missing or malformed.
pub fn service_port_for(labels: &HashMap<String, String>, private_port: u16) -> u16 {
    let key = format!("{}{}", LABEL_SERVICE_PORT_PREFIX, private_port);

    let Some(value) = labels.get(&key) else {
        return 0;
    };

    match value.parse::<u16>() {
        Ok(port) => port,
        Err(e) => {
            tracing::debug!("Ignoring label {}={:?}: {}", key, value, e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_labels_passthrough() {
        let labels = HashMap::from([
            ("ProxyMode".to_string(), "http".to_string()),
            ("HealthCheck".to_string(), "HttpGet".to_string()),
            ("HealthCheckArgs".to_string(), "http://127.0.0.1:39519/status/check".to_string()),
        ]);

        let parsed = ServiceLabels::from_labels(&labels);
        assert_eq!(parsed.proxy_mode, "http");
        assert_eq!(parsed.health_check, "HttpGet");
        assert_eq!(parsed.health_check_args, "http://127.0.0.1:39519/status/check");
    }

    #[test]
    fn test_service_labels_missing() {
        assert_eq!(ServiceLabels::from_labels(&HashMap::new()), ServiceLabels::default());
    }

    #[test]
    fn test_service_port_for() {
        let mut labels = HashMap::from([("ServicePort_80".to_string(), "8080".to_string())]);
        assert_eq!(service_port_for(&labels, 80), 8080);
        assert_eq!(service_port_for(&labels, 81), 0);

        labels.insert("ServicePort_80".to_string(), "not a number".to_string());
        assert_eq!(service_port_for(&labels, 80), 0);

        labels.insert("ServicePort_80".to_string(), "70000".to_string());
        assert_eq!(service_port_for(&labels, 80), 0, "Out of range ports degrade to 0");

        labels.insert("ServicePort_80".to_string(), "-1".to_string());
        assert_eq!(service_port_for(&labels, 80), 0, "Negative ports degrade to 0");
    }
}
