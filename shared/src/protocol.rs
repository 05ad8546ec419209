/// Container label declaring the logical port of a private port, suffixed
/// with the private port number, e.g. "ServicePort_8080"
pub const LABEL_SERVICE_PORT_PREFIX: &str = "ServicePort_";

/// Container labels passed through to the service record unchanged
pub const LABEL_PROXY_MODE: &str = "ProxyMode";
pub const LABEL_HEALTH_CHECK: &str = "HealthCheck";
pub const LABEL_HEALTH_CHECK_ARGS: &str = "HealthCheckArgs";

/// Length of the short container id used as the service id
pub const SHORT_ID_LEN: usize = 12;

/// API path prefix
pub const API_PREFIX: &str = "/v1";
