use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static IPV4_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+\.\d+\.\d+)").expect("IPv4 regex is hardcoded and valid"));

/// Whether a discovered address is internal-network-only or routable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressClass {
    /// 10/8, 172.16/12, 192.168/16, 169.254/16 or 127/8
    Private,
    /// Anything else, including strings that do not parse
    Public,
}

/// Split a dotted quad into its four numeric parts.
///
/// Parts are read as plain decimal numbers, so leading zeros are accepted
/// (`192.168.001.5`) and out-of-range parts are kept as-is.
fn octets(addr: &str) -> Option<[u32; 4]> {
    let mut parts = addr.split('.').map(|part| part.parse::<u32>().ok());
    let octets = [parts.next()??, parts.next()??, parts.next()??, parts.next()??];
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Classify a dotted-quad address.
#[must_use]
pub fn classify_address(addr: &str) -> AddressClass {
    match octets(addr) {
        Some([10 | 127, ..] | [172, 16..=31, ..] | [192, 168, ..] | [169, 254, ..]) => {
            AddressClass::Private
        }
        _ => AddressClass::Public,
    }
}

/// Extract the first embedded dotted-quad from a candidate descriptor.
#[must_use]
pub fn extract_ipv4(candidate: &str) -> Option<&str> {
    IPV4_PATTERN.find(candidate).map(|m| m.as_str())
}

/// 192.168/16, the usual home wireless range.
pub(crate) fn is_wireless_range(addr: &str) -> bool {
    matches!(octets(addr), Some([192, 168, ..]))
}

/// 10/8 or 172.16/12, the usual wired/corporate ranges.
pub(crate) fn is_wired_range(addr: &str) -> bool {
    matches!(octets(addr), Some([10, ..] | [172, 16..=31, ..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_addresses() {
        for addr in [
            "10.0.0.5",
            "172.20.1.1",
            "192.168.1.1",
            "169.254.0.1",
            "127.0.0.1",
            "172.16.0.1",
            "172.31.255.255",
        ] {
            assert_eq!(classify_address(addr), AddressClass::Private, "{addr}");
        }
    }

    #[test]
    fn test_public_addresses() {
        for addr in ["8.8.8.8", "172.32.0.1", "172.15.0.1", "203.0.113.7", "999.1.1.1"] {
            assert_eq!(classify_address(addr), AddressClass::Public, "{addr}");
        }
    }

    #[test]
    fn test_extract_from_candidate() {
        let line = "candidate:842163049 1 udp 1677729535 198.51.100.4 61000 typ srflx raddr 0.0.0.0";
        assert_eq!(extract_ipv4(line), Some("198.51.100.4"));

        let mdns = "candidate:1 1 udp 2122260223 3f1c2a9e-0b9d-4a5e.local 54321 typ host";
        assert_eq!(extract_ipv4(mdns), None);
    }

    #[test]
    fn test_leading_zero_octets() {
        assert_eq!(classify_address("192.168.001.5"), AddressClass::Private);
        assert_eq!(classify_address("010.0.0.1"), AddressClass::Private);
        assert_eq!(classify_address("10.500.0.1"), AddressClass::Private);
        assert_eq!(classify_address("192.168.1"), AddressClass::Public);
        assert_eq!(classify_address("192.168.1.1.1"), AddressClass::Public);
        assert!(is_wireless_range("192.168.001.5"));
    }

    #[test]
    fn test_interface_ranges() {
        assert!(is_wireless_range("192.168.0.10"));
        assert!(!is_wireless_range("10.0.0.1"));
        assert!(is_wired_range("10.1.2.3"));
        assert!(is_wired_range("172.16.5.5"));
        assert!(!is_wired_range("172.32.5.5"));
    }
}
