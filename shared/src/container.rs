use std::collections::HashMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of one running container as listed by the runtime.
/// Field names follow the Docker Engine `GET /containers/json` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDescriptor {
    /// Full container id
    pub id: String,

    #[serde(default)]
    pub image: String,

    /// Creation time in seconds since the Unix epoch
    #[serde(default)]
    pub created: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<PortDescriptor>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
}

/// One port entry of a container listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    #[serde(rename = "PrivatePort")]
    pub private_port: u16,

    /// Host port; absent in the listing when the port is not published
    #[serde(rename = "PublicPort", default)]
    pub public_port: u16,

    #[serde(rename = "Type")]
    pub port_type: String,

    #[serde(rename = "IP", default)]
    pub ip: String,
}

/// The runtime reports empty collections as `null` in some versions
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_container_listing() {
        let json = r#"[{
            "Id": "88862023487fa0ae043c47d7b441f684fc39145d1d9fa398450e4da2e53af5e8",
            "Names": ["/sample-app"],
            "Image": "example.com/docker/fabulous-container:latest",
            "Command": "/fabulous_app",
            "Created": 1457144774,
            "Ports": [
                {"PrivatePort": 9990, "Type": "tcp"},
                {"IP": "192.168.77.13", "PrivatePort": 8080, "PublicPort": 31355, "Type": "tcp"}
            ],
            "Labels": {"ProxyMode": "tcp"},
            "State": "running",
            "Status": "Up 34 seconds"
        }]"#;

        let containers: Vec<ContainerDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(containers.len(), 1);

        let c = &containers[0];
        assert_eq!(c.created, 1457144774);
        assert_eq!(c.names, vec!["/sample-app".to_string()]);
        assert_eq!(c.ports[0].public_port, 0);
        assert_eq!(c.ports[0].ip, "");
        assert_eq!(c.ports[1].public_port, 31355);
        assert_eq!(c.ports[1].ip, "192.168.77.13");
        assert_eq!(c.labels.get("ProxyMode").map(String::as_str), Some("tcp"));
    }

    #[test]
    fn test_decode_null_collections() {
        let json = r#"{"Id": "abc", "Names": null, "Ports": null, "Labels": null}"#;

        let c: ContainerDescriptor = serde_json::from_str(json).unwrap();
        assert!(c.names.is_empty());
        assert!(c.ports.is_empty());
        assert!(c.labels.is_empty());
    }
}
