//! Remote host discovery
//!
//! Runs a handful of commands over an established SSH session to learn what
//! the deployer needs about a server: hostname, machine architecture, and
//! the primary network identity (interface, IPv4, MAC) used for NFS exports
//! and Wake-on-LAN.

use crate::error::{Error, Result};
use crate::ssh::RemoteTransport;

/// Interface selection script, emitting `iface|ip|mac` on a single line.
///
/// Selection order: interface on the route toward 1.1.1.1, then the default
/// route's interface, then the first non-loopback interface. The MAC comes
/// from sysfs rather than parsed tool output.
const NET_DISCOVERY_SCRIPT: &str = r#"
# Find default interface
iface=$(ip route get 1.1.1.1 2>/dev/null | awk '{for(i=1;i<=NF;i++) if($i=="dev") print $(i+1); exit}')
if [ -z "$iface" ]; then
	# Fallback: check default route
	iface=$(ip route show default 2>/dev/null | awk '/default/ {for(i=1;i<=NF;i++) if($i=="dev") print $(i+1); exit}')
fi

# Fallback 2: First non-loopback interface
if [ -z "$iface" ]; then
	iface=$(ls /sys/class/net/ | grep -v lo | head -n1)
fi

if [ -z "$iface" ]; then
	echo "error|no_interface_found|00:00:00:00:00:00"
	exit 1
fi

# Get IP (IPv4)
ip=$(ip -4 addr show $iface 2>/dev/null | awk '/inet/ {print $2}' | cut -d/ -f1 | head -n1)
if [ -z "$ip" ]; then
	ip="0.0.0.0"
fi

# Get MAC
if [ -f "/sys/class/net/$iface/address" ]; then
	mac=$(cat /sys/class/net/$iface/address)
else
	mac="00:00:00:00:00:00"
fi

echo "$iface|$ip|$mac"
"#;

/// Facts gathered from a remote host, consumed during one apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFacts {
    pub hostname: String,
    /// Machine architecture token as reported by `uname -m`
    pub arch: String,
    /// Primary egress interface name
    pub interface: String,
    /// Primary IPv4 address
    pub ip: String,
    /// Primary MAC address, colon-separated
    pub mac: String,
}

/// Probe a connected host and return its facts.
pub fn probe(transport: &mut dyn RemoteTransport) -> Result<RemoteFacts> {
    let hostname = transport.run("uname -n")?;
    let arch = transport.run("uname -m")?;

    let net = transport.run(NET_DISCOVERY_SCRIPT)?;
    let (interface, ip, mac) = parse_net_info(&net)?;

    Ok(RemoteFacts {
        hostname,
        arch,
        interface,
        ip,
        mac,
    })
}

/// Parse the `iface|ip|mac` triple emitted by the discovery script.
///
/// Exactly three pipe-separated fields are required; each is trimmed.
pub fn parse_net_info(raw: &str) -> Result<(String, String, String)> {
    let parts: Vec<&str> = raw.trim().split('|').collect();
    if parts.len() != 3 {
        return Err(Error::MalformedProbe(format!(
            "expected 3 fields, got: {raw}"
        )));
    }
    Ok((
        parts[0].trim().to_string(),
        parts[1].trim().to_string(),
        parts[2].trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_net_info() {
        let (iface, ip, mac) = parse_net_info("enp3s0|10.0.0.1|00:11:22:33:44:55\n").unwrap();
        assert_eq!(iface, "enp3s0");
        assert_eq!(ip, "10.0.0.1");
        assert_eq!(mac, "00:11:22:33:44:55");
    }

    #[test]
    fn test_parse_net_info_trims_fields() {
        let (iface, ip, mac) = parse_net_info(" eth0 | 1.2.3.4 | aa:bb:cc:dd:ee:ff ").unwrap();
        assert_eq!(iface, "eth0");
        assert_eq!(ip, "1.2.3.4");
        assert_eq!(mac, "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_parse_net_info_rejects_wrong_arity() {
        assert!(matches!(
            parse_net_info("eth0|1.2.3.4"),
            Err(Error::MalformedProbe(_))
        ));
        assert!(matches!(
            parse_net_info("a|b|c|d"),
            Err(Error::MalformedProbe(_))
        ));
        assert!(matches!(parse_net_info(""), Err(Error::MalformedProbe(_))));
    }
}
