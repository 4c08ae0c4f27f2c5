//! Address-family filtering DNS resolver for reqwest.
//!
//! Implements `reqwest::dns::Resolve` by delegating to the system resolver and
//! keeping only the addresses of the requested family. When nothing of that
//! family is left the lookup fails before reqwest opens a socket.

use std::io;
use std::net::SocketAddr;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use crate::config::AddressFamily;

/// System resolver restricted to one address family.
#[derive(Debug, Clone, Copy)]
pub struct FamilyResolver {
    family: AddressFamily,
}

impl FamilyResolver {
    pub fn new(family: AddressFamily) -> Self {
        FamilyResolver { family }
    }
}

impl Resolve for FamilyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let family = self.family;
        Box::pin(async move {
            let host = format!("{}:0", name.as_str());
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&host)
                .await
                .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })?
                .collect();

            let kept = filter_family(addrs, family);
            if kept.is_empty() {
                return Err(Box::new(io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("no {:?} address found for '{}'", family, name.as_str()),
                )) as Box<dyn std::error::Error + Send + Sync>);
            }

            log::debug!("Resolved {} to {:?}", name.as_str(), kept);
            let addrs: Addrs = Box::new(kept.into_iter());
            Ok(addrs)
        })
    }
}

fn filter_family(addrs: Vec<SocketAddr>, family: AddressFamily) -> Vec<SocketAddr> {
    addrs
        .into_iter()
        .filter(|addr| family.allows(addr.ip()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Vec<SocketAddr> {
        vec![
            "192.0.2.10:0".parse().unwrap(),
            "[2001:db8::10]:0".parse().unwrap(),
            "198.51.100.7:0".parse().unwrap(),
        ]
    }

    #[test]
    fn test_filter_keeps_requested_family() {
        let v4 = filter_family(sample(), AddressFamily::V4Only);
        assert_eq!(v4.len(), 2);
        assert!(v4.iter().all(|a| a.is_ipv4()));

        let v6 = filter_family(sample(), AddressFamily::V6Only);
        assert_eq!(v6, vec!["[2001:db8::10]:0".parse::<SocketAddr>().unwrap()]);

        assert_eq!(filter_family(sample(), AddressFamily::Any).len(), 3);
    }

    #[tokio::test]
    async fn test_resolves_localhost_over_ipv4() {
        let resolver = FamilyResolver::new(AddressFamily::V4Only);
        let addrs: Vec<SocketAddr> = resolver
            .resolve(Name::from_str("localhost").unwrap())
            .await
            .unwrap()
            .collect();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|a| a.is_ipv4()));
    }
}
