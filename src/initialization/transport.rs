//! Transport settings for one exchange.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{NoProxy, Proxy, Url};

use crate::config::{AddressFamily, RequestConfiguration, UNIX_SOCKET_BASE_URL};
use crate::error_handling::{CurlError, Stage};

/// Which requests a proxy route applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    All,
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    pub scheme: ProxyScheme,
    pub url: String,
}

/// Outbound proxies and their exemptions.
///
/// Built from `--proxy` when given. Otherwise, when a no-proxy list is
/// configured, the environment proxies are taken over explicitly so the list
/// applies to them too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub routes: Vec<ProxyRoute>,
    pub no_proxy: Option<String>,
}

/// Environment variables read for proxies, lowercase first like curl.
const PROXY_ENV_VARS: [(&str, &str, ProxyScheme); 3] = [
    ("http_proxy", "HTTP_PROXY", ProxyScheme::Http),
    ("https_proxy", "HTTPS_PROXY", ProxyScheme::Https),
    ("all_proxy", "ALL_PROXY", ProxyScheme::All),
];

/// Connection-level settings derived from a [`RequestConfiguration`].
///
/// Precedence follows the order of the fields: TLS trust is applied by the
/// client builder first, then the connect timeout, the Unix socket override,
/// the address family, the overall deadline and finally the proxy.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// URL the first hop is sent to (rewritten in Unix-socket mode)
    pub target_url: String,
    pub connect_timeout: Option<Duration>,
    pub unix_socket: Option<PathBuf>,
    pub address_family: AddressFamily,
    pub deadline: Option<Duration>,
    pub proxy: Option<ProxySettings>,
}

impl TransportConfig {
    /// # Errors
    ///
    /// Returns a configuration error if the proxy URL does not parse, or if the
    /// target host is an IP literal outside the requested address family.
    pub fn from_configuration(config: &RequestConfiguration) -> Result<Self, CurlError> {
        let target_url = match &config.unix_socket {
            Some(socket) => {
                let rewritten = rewrite_for_unix_socket(&config.url);
                log::debug!(
                    "Routing {} through Unix socket {}",
                    rewritten,
                    socket.display()
                );
                rewritten
            }
            None => config.url.clone(),
        };

        let no_proxy = config.no_proxy.clone().filter(|n| !n.is_empty());
        let proxy = match config.proxy.as_deref().filter(|p| !p.is_empty()) {
            Some(url) => {
                // Validate eagerly so a bad proxy never falls back to the environment.
                parse_proxy(ProxyScheme::All, url)?;
                Some(ProxySettings {
                    routes: vec![ProxyRoute {
                        scheme: ProxyScheme::All,
                        url: url.to_string(),
                    }],
                    no_proxy,
                })
            }
            None if config.unix_socket.is_none() => {
                no_proxy.and_then(|list| environment_proxies(list, |key| std::env::var(key).ok()))
            }
            None => None,
        };

        let transport = TransportConfig {
            target_url,
            connect_timeout: config.connect_timeout,
            unix_socket: config.unix_socket.clone(),
            address_family: config.address_family,
            deadline: config.max_time,
            proxy,
        };

        if transport.unix_socket.is_none() {
            if let Ok(url) = Url::parse(&transport.target_url) {
                transport.check_address_family(&url)?;
            }
        }

        Ok(transport)
    }

    /// Rejects IP-literal hosts of the wrong family.
    ///
    /// Named hosts are filtered later by the resolver.
    pub fn check_address_family(&self, url: &Url) -> Result<(), CurlError> {
        let Some(ip) = literal_ip(url) else {
            return Ok(());
        };
        if self.address_family.allows(ip) {
            Ok(())
        } else {
            Err(CurlError::configuration(
                Stage::Transport,
                format!(
                    "address {} is not allowed by the {} restriction",
                    ip,
                    self.address_family.describe()
                ),
            ))
        }
    }

    /// Builds the reqwest proxies, empty when none is configured.
    pub fn build_proxies(&self) -> Result<Vec<Proxy>, CurlError> {
        let Some(settings) = &self.proxy else {
            return Ok(Vec::new());
        };
        settings
            .routes
            .iter()
            .map(|route| {
                let proxy = parse_proxy(route.scheme, &route.url)?;
                let no_proxy = settings.no_proxy.as_deref().and_then(NoProxy::from_string);
                Ok(proxy.no_proxy(no_proxy))
            })
            .collect()
    }
}

fn parse_proxy(scheme: ProxyScheme, url: &str) -> Result<Proxy, CurlError> {
    let proxy = match scheme {
        ProxyScheme::All => Proxy::all(url),
        ProxyScheme::Http => Proxy::http(url),
        ProxyScheme::Https => Proxy::https(url),
    };
    proxy.map_err(|e| {
        CurlError::configuration(
            Stage::Transport,
            format!("invalid proxy URL {:?}: {}", url, e),
        )
    })
}

/// Takes over the environment proxies so `no_proxy` applies to them.
///
/// Returns `None` when no proxy variable is set, leaving reqwest's own
/// environment handling in place. The environment's `NO_PROXY` entries are
/// kept alongside the configured list. Unparsable variables are skipped.
fn environment_proxies<F>(no_proxy: String, lookup: F) -> Option<ProxySettings>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |lower: &str, upper: &str| {
        lookup(lower)
            .or_else(|| lookup(upper))
            .filter(|value| !value.trim().is_empty())
    };

    let routes: Vec<ProxyRoute> = PROXY_ENV_VARS
        .iter()
        .filter_map(|(lower, upper, scheme)| {
            let url = read(*lower, *upper)?;
            match parse_proxy(*scheme, &url) {
                Ok(_) => Some(ProxyRoute {
                    scheme: *scheme,
                    url,
                }),
                Err(e) => {
                    log::warn!("Ignoring {}: {}", upper, e);
                    None
                }
            }
        })
        .collect();
    if routes.is_empty() {
        return None;
    }

    let no_proxy = match read("no_proxy", "NO_PROXY") {
        Some(env_list) => format!("{},{}", no_proxy, env_list),
        None => no_proxy,
    };
    log::debug!("Applying no-proxy list {:?} to environment proxies", no_proxy);
    Some(ProxySettings {
        routes,
        no_proxy: Some(no_proxy),
    })
}

impl AddressFamily {
    pub fn allows(&self, ip: IpAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4Only => ip.is_ipv4(),
            AddressFamily::V6Only => ip.is_ipv6(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            AddressFamily::Any => "any-family",
            AddressFamily::V4Only => "IPv4-only",
            AddressFamily::V6Only => "IPv6-only",
        }
    }
}

fn literal_ip(url: &Url) -> Option<IpAddr> {
    match url.host()? {
        url::Host::Ipv4(v4) => Some(IpAddr::V4(v4)),
        url::Host::Ipv6(v6) => Some(IpAddr::V6(v6)),
        url::Host::Domain(_) => None,
    }
}

/// Scheme-less targets become `http://localhost<target>`; the host is ignored
/// by the socket connector anyway.
fn rewrite_for_unix_socket(target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else if target.starts_with('/') {
        format!("{}{}", UNIX_SOCKET_BASE_URL, target)
    } else {
        format!("{}/{}", UNIX_SOCKET_BASE_URL, target)
    }
}
