use chrono::{DateTime, Utc};

/// Source of the current time for builders and staleness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed instant is a clock that never moves
impl Clock for DateTime<Utc> {
    fn now(&self) -> DateTime<Utc> {
        *self
    }
}

/// Source of the hostname stamped on every record built by this host.
pub trait HostnameProvider: Send + Sync {
    fn hostname(&self) -> String;
}

/// Hostname as reported by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostname;

impl HostnameProvider for SystemHostname {
    fn hostname(&self) -> String {
        match hostname::get() {
            Ok(name) => name.to_string_lossy().to_string(),
            Err(e) => {
                tracing::warn!("Failed to get system hostname: {}", e);
                String::new()
            }
        }
    }
}

/// A fixed hostname, e.g. a configured override or one resolved once at startup
impl HostnameProvider for String {
    fn hostname(&self) -> String {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let instant = DateTime::from_timestamp(1457144774, 0).unwrap();
        assert_eq!(instant.now(), instant);
    }

    #[test]
    fn test_fixed_hostname() {
        assert_eq!("beowulf".to_string().hostname(), "beowulf");
    }
}
