//! HTTP redirect policy.
//!
//! Redirects are followed manually: reqwest's own redirect handling is off and
//! the execution engine asks a [`RedirectPolicy`] what to do after every
//! response. The policy counts hops and rewrites method, body and credentials
//! for the next hop.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION};
use reqwest::{Method, StatusCode, Url};

use crate::config::{RequestConfiguration, REDIRECT_STATUS_CODES};
use crate::request::{RequestBody, RequestSpec};

/// Method, target and headers of one physical request.
///
/// The body is tracked separately by the engine because a streamed body is
/// consumed by the send.
#[derive(Debug, Clone)]
pub struct HopRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl HopRequest {
    /// Splits an assembled request into its first hop and its body.
    pub fn from_spec(spec: RequestSpec) -> (Self, RequestBody) {
        let hop = HopRequest {
            method: spec.method,
            url: spec.url,
            headers: spec.headers,
        };
        (hop, spec.body)
    }
}

/// Verdict for one response.
#[derive(Debug)]
pub enum RedirectDecision {
    /// Send `next`; re-send the previous body only if `keep_body`.
    Follow { next: HopRequest, keep_body: bool },
    /// The hop limit was reached.
    StopWithError { max: usize },
    /// Return this response as the final one.
    StopSilently,
}

/// Per-exchange redirect state.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    follow: bool,
    max_hops: usize,
    trusted: bool,
    hops: usize,
    original_authorization: Option<HeaderValue>,
    original_host: Option<String>,
}

impl RedirectPolicy {
    /// Creates the policy for an exchange whose first hop is `initial`.
    pub fn new(config: &RequestConfiguration, initial: &HopRequest) -> Self {
        RedirectPolicy {
            follow: config.follow_redirects,
            max_hops: config.max_redirects,
            trusted: config.location_trusted,
            hops: 0,
            original_authorization: initial.headers.get(AUTHORIZATION).cloned(),
            original_host: initial.url.host_str().map(str::to_ascii_lowercase),
        }
    }

    /// Number of redirects followed so far.
    pub fn hops(&self) -> usize {
        self.hops
    }

    pub fn decide(
        &mut self,
        current: &HopRequest,
        body: &RequestBody,
        status: StatusCode,
        response_headers: &HeaderMap,
    ) -> RedirectDecision {
        if !is_redirect(status) || !self.follow {
            return RedirectDecision::StopSilently;
        }

        let Some(location) = resolve_location(&current.url, response_headers) else {
            log::warn!(
                "Redirect status {} for {} but no usable Location header",
                status.as_u16(),
                current.url
            );
            return RedirectDecision::StopSilently;
        };

        if self.hops >= self.max_hops {
            return RedirectDecision::StopWithError { max: self.max_hops };
        }

        let (method, keep_body) = match status.as_u16() {
            307 | 308 => {
                if !body.is_replayable() {
                    log::warn!(
                        "Not following {} to {}: streamed request body cannot be re-sent",
                        status.as_u16(),
                        location
                    );
                    return RedirectDecision::StopSilently;
                }
                (current.method.clone(), !body.is_empty())
            }
            _ if current.method == Method::GET || current.method == Method::HEAD => {
                (current.method.clone(), false)
            }
            _ => (Method::GET, false),
        };

        let mut headers = current.headers.clone();
        headers.remove(AUTHORIZATION);
        if self.trusted {
            if let Some(authorization) = &self.original_authorization {
                headers.insert(AUTHORIZATION, authorization.clone());
            }
        }
        if !keep_body {
            headers.remove(CONTENT_TYPE);
        }
        if !self.trusted && !self.is_original_host(&location) {
            headers.remove(COOKIE);
        }

        self.hops += 1;
        log::debug!(
            "Redirect {}/{}: {} {} -> {} {}",
            self.hops,
            self.max_hops,
            status.as_u16(),
            current.url,
            method,
            location
        );

        RedirectDecision::Follow {
            next: HopRequest {
                method,
                url: location,
                headers,
            },
            keep_body,
        }
    }

    fn is_original_host(&self, url: &Url) -> bool {
        match (&self.original_host, url.host_str()) {
            (Some(original), Some(host)) => original.eq_ignore_ascii_case(host),
            _ => false,
        }
    }
}

pub fn is_redirect(status: StatusCode) -> bool {
    REDIRECT_STATUS_CODES.contains(&status.as_u16())
}

/// Resolves the Location header against the current URL.
fn resolve_location(current: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(LOCATION)?.to_str().ok()?.trim();
    if location.is_empty() {
        return None;
    }
    current.join(location).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop(method: Method, url: &str, headers: &[(&'static str, &str)]) -> HopRequest {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        HopRequest {
            method,
            url: Url::parse(url).unwrap(),
            headers: map,
        }
    }

    fn location(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn following(max: usize, trusted: bool) -> RequestConfiguration {
        RequestConfiguration {
            follow_redirects: true,
            max_redirects: max,
            location_trusted: trusted,
            ..Default::default()
        }
    }

    fn expect_follow(decision: RedirectDecision) -> (HopRequest, bool) {
        match decision {
            RedirectDecision::Follow { next, keep_body } => (next, keep_body),
            other => panic!("expected Follow, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_redirects_stop_silently() {
        let first = hop(Method::GET, "http://a.test/", &[]);
        let mut policy = RedirectPolicy::new(&RequestConfiguration::default(), &first);
        let decision = policy.decide(&first, &RequestBody::Empty, StatusCode::FOUND, &location("/b"));
        assert!(matches!(decision, RedirectDecision::StopSilently));
        assert_eq!(policy.hops(), 0);
    }

    #[test]
    fn test_non_redirect_status_stops_silently() {
        let first = hop(Method::GET, "http://a.test/", &[]);
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let decision = policy.decide(&first, &RequestBody::Empty, StatusCode::OK, &location("/b"));
        assert!(matches!(decision, RedirectDecision::StopSilently));
    }

    #[test]
    fn test_limit_errors_on_redirect_after_max_hops() {
        let mut current = hop(Method::GET, "http://a.test/0", &[]);
        let mut policy = RedirectPolicy::new(&following(3, false), &current);
        for i in 1..=3 {
            let decision = policy.decide(
                &current,
                &RequestBody::Empty,
                StatusCode::FOUND,
                &location(&format!("/{}", i)),
            );
            current = expect_follow(decision).0;
            assert_eq!(policy.hops(), i);
        }
        let decision = policy.decide(&current, &RequestBody::Empty, StatusCode::FOUND, &location("/4"));
        assert!(matches!(decision, RedirectDecision::StopWithError { max: 3 }));
    }

    #[test]
    fn test_zero_max_with_follow_rejects_first_redirect() {
        let first = hop(Method::GET, "http://a.test/", &[]);
        let mut policy = RedirectPolicy::new(&following(0, false), &first);
        let decision = policy.decide(&first, &RequestBody::Empty, StatusCode::MOVED_PERMANENTLY, &location("/b"));
        assert!(matches!(decision, RedirectDecision::StopWithError { max: 0 }));
    }

    #[test]
    fn test_location_is_resolved_relative_to_current_url() {
        let first = hop(Method::GET, "http://a.test/dir/page", &[]);
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let (next, _) = expect_follow(policy.decide(
            &first,
            &RequestBody::Empty,
            StatusCode::FOUND,
            &location("other?x=1"),
        ));
        assert_eq!(next.url.as_str(), "http://a.test/dir/other?x=1");
    }

    #[test]
    fn test_missing_location_returns_response() {
        let first = hop(Method::GET, "http://a.test/", &[]);
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let decision = policy.decide(&first, &RequestBody::Empty, StatusCode::FOUND, &HeaderMap::new());
        assert!(matches!(decision, RedirectDecision::StopSilently));
    }

    #[test]
    fn test_authorization_dropped_without_trust() {
        let first = hop(Method::GET, "http://a.test/", &[("authorization", "Bearer t")]);
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let (next, _) = expect_follow(policy.decide(&first, &RequestBody::Empty, StatusCode::FOUND, &location("/b")));
        assert!(next.headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_authorization_reattached_on_every_trusted_hop() {
        let first = hop(Method::GET, "http://a.test/", &[("authorization", "Bearer t")]);
        let mut policy = RedirectPolicy::new(&following(5, true), &first);
        let (second, _) = expect_follow(policy.decide(
            &first,
            &RequestBody::Empty,
            StatusCode::FOUND,
            &location("http://b.test/"),
        ));
        assert_eq!(second.headers.get(AUTHORIZATION).unwrap(), "Bearer t");
        let (third, _) = expect_follow(policy.decide(
            &second,
            &RequestBody::Empty,
            StatusCode::FOUND,
            &location("http://c.test/"),
        ));
        assert_eq!(third.headers.get(AUTHORIZATION).unwrap(), "Bearer t");
    }

    #[test]
    fn test_post_becomes_bodiless_get_on_303() {
        let first = hop(
            Method::POST,
            "http://a.test/form",
            &[("content-type", "application/json"), ("x-keep", "1")],
        );
        let body = RequestBody::Buffered(b"{}".to_vec());
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let (next, keep_body) =
            expect_follow(policy.decide(&first, &body, StatusCode::SEE_OTHER, &location("/done")));
        assert_eq!(next.method, Method::GET);
        assert!(!keep_body);
        assert!(next.headers.get(CONTENT_TYPE).is_none());
        assert_eq!(next.headers.get("x-keep").unwrap(), "1");
    }

    #[test]
    fn test_head_stays_head_on_301() {
        let first = hop(Method::HEAD, "http://a.test/", &[]);
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let (next, _) = expect_follow(policy.decide(
            &first,
            &RequestBody::Empty,
            StatusCode::MOVED_PERMANENTLY,
            &location("/b"),
        ));
        assert_eq!(next.method, Method::HEAD);
    }

    #[test]
    fn test_307_replays_method_and_body() {
        let first = hop(Method::PUT, "http://a.test/x", &[("content-type", "application/json")]);
        let body = RequestBody::Buffered(b"data".to_vec());
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let (next, keep_body) = expect_follow(policy.decide(
            &first,
            &body,
            StatusCode::TEMPORARY_REDIRECT,
            &location("/y"),
        ));
        assert_eq!(next.method, Method::PUT);
        assert!(keep_body);
        assert_eq!(next.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_307_with_streamed_body_is_not_followed() {
        let first = hop(Method::PUT, "http://a.test/x", &[]);
        let body = RequestBody::Streamed {
            origin: "test".to_string(),
            reader: Box::new(tokio::io::empty()),
        };
        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let decision = policy.decide(&first, &body, StatusCode::PERMANENT_REDIRECT, &location("/y"));
        assert!(matches!(decision, RedirectDecision::StopSilently));
        assert_eq!(policy.hops(), 0);
    }

    #[test]
    fn test_cookie_dropped_on_cross_host_hop_unless_trusted() {
        let first = hop(Method::GET, "http://a.test/", &[("cookie", "s=1")]);

        let mut policy = RedirectPolicy::new(&following(5, false), &first);
        let (same_host, _) = expect_follow(policy.decide(&first, &RequestBody::Empty, StatusCode::FOUND, &location("/b")));
        assert_eq!(same_host.headers.get(COOKIE).unwrap(), "s=1");
        let (other_host, _) = expect_follow(policy.decide(
            &same_host,
            &RequestBody::Empty,
            StatusCode::FOUND,
            &location("http://evil.test/"),
        ));
        assert!(other_host.headers.get(COOKIE).is_none());

        let mut trusted = RedirectPolicy::new(&following(5, true), &first);
        let (kept, _) = expect_follow(trusted.decide(
            &first,
            &RequestBody::Empty,
            StatusCode::FOUND,
            &location("http://other.test/"),
        ));
        assert_eq!(kept.headers.get(COOKIE).unwrap(), "s=1");
    }
}
