//! Redirect-following state machine.
//!
//! Each hop's outcome is folded into the chain by [`next_step`], which
//! consumes the current [`RedirectChain`] and yields either the chain for
//! the next hop or the terminal chain. No state is mutated in place.

use axum::http::{HeaderValue, StatusCode};
use url::Url;

/// URLs visited so far plus the URL of the pending hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectChain {
    current: Url,
    visited: Vec<Url>,
}

impl RedirectChain {
    pub fn start(url: Url) -> Self {
        Self {
            current: url,
            visited: Vec::new(),
        }
    }

    /// URL the next (or final) hop targets.
    pub fn current(&self) -> &Url {
        &self.current
    }


    pub fn redirects_followed(&self) -> u32 {
        self.visited.len() as u32
    }

    fn advance(self, next: Url) -> Self {
        let mut visited = self.visited;
        visited.push(self.current);
        Self {
            current: next,
            visited,
        }
    }

    pub fn into_parts(self) -> (Url, Vec<Url>) {
        (self.current, self.visited)
    }
}

/// What to do after observing a hop's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Issue another hop with this chain.
    Follow(RedirectChain),
    /// The response just observed is the one returned to the caller.
    Done(RedirectChain),
}

/// Decide the next step from a hop's status and `Location` header.
///
/// A 3xx with a resolvable `http(s)` location is followed unless
/// `max_redirects` have already been followed. Anything else is terminal,
/// including a `Location` that cannot be resolved against the current URL.
pub fn next_step(
    chain: RedirectChain,
    status: StatusCode,
    location: Option<&HeaderValue>,
    max_redirects: u32,
) -> Step {
    if !status.is_redirection() {
        return Step::Done(chain);
    }
    let location = match location.and_then(|l| l.to_str().ok()) {
        Some(l) if !l.is_empty() => l,
        _ => return Step::Done(chain),
    };

    if chain.redirects_followed() >= max_redirects {
        tracing::debug!(
            max_redirects,
            url = %chain.current(),
            "Redirect limit reached, returning redirect response"
        );
        return Step::Done(chain);
    }

    match chain.current().join(location) {
        Ok(next) if matches!(next.scheme(), "http" | "https") => {
            tracing::debug!(from = %chain.current(), to = %next, "Following redirect");
            Step::Follow(chain.advance(next))
        }
        Ok(next) => {
            tracing::warn!(location = %next, "Redirect to unsupported scheme not followed");
            Step::Done(chain)
        }
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "Unresolvable redirect location");
            Step::Done(chain)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(url: &str) -> RedirectChain {
        RedirectChain::start(Url::parse(url).unwrap())
    }

    fn loc(value: &'static str) -> HeaderValue {
        HeaderValue::from_static(value)
    }

    #[test]
    fn test_non_redirect_is_terminal() {
        let chain = start("http://a.com/");
        let step = next_step(chain.clone(), StatusCode::OK, Some(&loc("/next")), 5);
        assert_eq!(step, Step::Done(chain));
    }

    #[test]
    fn test_redirect_without_location_is_terminal() {
        let chain = start("http://a.com/");
        let step = next_step(chain.clone(), StatusCode::FOUND, None, 5);
        assert_eq!(step, Step::Done(chain));
    }

    #[test]
    fn test_relative_location_followed() {
        let step = next_step(
            start("http://a.com/start"),
            StatusCode::MOVED_PERMANENTLY,
            Some(&loc("/next")),
            5,
        );
        match step {
            Step::Follow(chain) => {
                assert_eq!(chain.current().as_str(), "http://a.com/next");
                assert_eq!(chain.redirects_followed(), 1);
                let (_, visited) = chain.into_parts();
                assert_eq!(visited[0].as_str(), "http://a.com/start");
            }
            other => panic!("expected follow, got {:?}", other),
        }
    }

    #[test]
    fn test_absolute_location_changes_host() {
        let step = next_step(
            start("http://a.com/"),
            StatusCode::TEMPORARY_REDIRECT,
            Some(&loc("https://b.com/landing")),
            5,
        );
        match step {
            Step::Follow(chain) => assert_eq!(chain.current().as_str(), "https://b.com/landing"),
            other => panic!("expected follow, got {:?}", other),
        }
    }

    #[test]
    fn test_budget_exhausted() {
        let chain = start("http://a.com/");
        let step = next_step(chain.clone(), StatusCode::FOUND, Some(&loc("/x")), 0);
        assert_eq!(step, Step::Done(chain));

        let mut chain = start("http://a.com/0");
        for i in 1..=2 {
            let location = HeaderValue::from_str(&format!("/{}", i)).unwrap();
            chain = match next_step(chain, StatusCode::FOUND, Some(&location), 2) {
                Step::Follow(c) => c,
                Step::Done(_) => panic!("stopped early"),
            };
        }
        let step = next_step(chain, StatusCode::FOUND, Some(&loc("/3")), 2);
        match step {
            Step::Done(chain) => {
                assert_eq!(chain.current().as_str(), "http://a.com/2");
                assert_eq!(chain.redirects_followed(), 2);
            }
            other => panic!("expected done, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_scheme_not_followed() {
        let chain = start("http://a.com/");
        let location = loc("ftp://files.a.com/x");
        let step = next_step(chain.clone(), StatusCode::FOUND, Some(&location), 5);
        assert_eq!(step, Step::Done(chain));
    }
}
