//! Client identifier redaction for log output.

use std::net::IpAddr;

/// Masks a client identifier so denials can be logged without the full address.
///
/// IPv4 keeps the first two octets, IPv6 keeps the first group, and anything
/// else keeps at most two leading characters.
pub fn redact_client(client: &str) -> String {
    match client.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            let [a, b, _, _] = v4.octets();
            format!("{a}.{b}.x.x")
        }
        Ok(IpAddr::V6(v6)) => format!("{:x}:****", v6.segments()[0]),
        Err(_) => {
            let head: String = client.chars().take(2).collect();
            format!("{head}****")
        }
    }
}
