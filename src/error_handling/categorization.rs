//! Error categorization.
//!
//! Maps `reqwest::Error` values onto [`NetworkErrorKind`] and flattens error
//! source chains for reporting.

use std::error::Error as StdError;

use super::types::NetworkErrorKind;

/// Categorizes a `reqwest::Error` into a `NetworkErrorKind`.
///
/// Timeouts are checked before connect errors: a connect timeout reports both,
/// and the timeout is the more useful diagnosis.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> NetworkErrorKind {
    if error.is_builder() {
        NetworkErrorKind::Builder
    } else if error.is_redirect() {
        NetworkErrorKind::Redirect
    } else if error.is_timeout() {
        NetworkErrorKind::Timeout
    } else if error.is_connect() {
        NetworkErrorKind::Connect
    } else if error.is_body() {
        NetworkErrorKind::Body
    } else if error.is_decode() {
        NetworkErrorKind::Decode
    } else if error.is_request() {
        NetworkErrorKind::Request
    } else {
        NetworkErrorKind::Other
    }
}

/// Joins an error and all of its sources into one `a: b: c` line.
///
/// reqwest's own message ("error sending request for url ...") hides the
/// actual cause (refused connection, DNS failure, certificate problem) in the
/// source chain. Adjacent duplicate messages are collapsed.
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = vec![error.to_string()];
    let mut current = error.source();
    while let Some(cause) = current {
        let message = cause.to_string();
        if parts.last() != Some(&message) {
            parts.push(message);
        }
        current = cause.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let error = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "client error (Connect)",
                source: Some(Box::new(Layer {
                    message: "Connection refused",
                    source: None,
                })),
            })),
        };
        assert_eq!(
            error_chain(&error),
            "error sending request: client error (Connect): Connection refused"
        );
    }

    #[test]
    fn test_error_chain_collapses_duplicates() {
        let error = Layer {
            message: "timed out",
            source: Some(Box::new(Layer {
                message: "timed out",
                source: None,
            })),
        };
        assert_eq!(error_chain(&error), "timed out");
    }

    #[tokio::test]
    async fn test_categorize_connect_error() {
        // Bind then drop a listener to get a local port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let error = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .expect_err("nothing listens on the port");
        assert_eq!(categorize_reqwest_error(&error), NetworkErrorKind::Connect);
    }

    #[test]
    fn test_categorize_builder_error() {
        let client = reqwest::Client::builder().build().unwrap();
        let error = client
            .get("not a url")
            .build()
            .expect_err("URL is invalid");
        assert_eq!(categorize_reqwest_error(&error), NetworkErrorKind::Builder);
    }
}
