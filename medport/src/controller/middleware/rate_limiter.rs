use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{
    super::{Error, Request, Response},
    Middleware, Outcome,
};
use async_trait::async_trait;

#[derive(Default, Debug)]
struct State {
    buckets: HashMap<IpAddr, Counter>,
}

#[derive(Debug)]
struct Counter {
    counter: u64,
    window_start: Instant,
}

impl Counter {
    fn new(window_start: Instant) -> Self {
        Self {
            counter: 0,
            window_start,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Frequency {
    Second(u64),
    Minute(u64),
}

impl Frequency {
    fn limit(&self) -> u64 {
        match self {
            Frequency::Second(limit) | Frequency::Minute(limit) => *limit,
        }
    }

    fn window(&self) -> Duration {
        match self {
            Frequency::Second(_) => Duration::from_secs(1),
            Frequency::Minute(_) => Duration::from_secs(60),
        }
    }
}

/// Fixed-window rate limiter which buckets requests by client IP.
///
/// Buckets by the socket address unless told to trust `X-Forwarded-For`, which only
/// makes sense behind a reverse proxy that sets it. Requests over the limit
/// get `429 - Too Many Requests` and never reach the controller.
pub struct RateLimiter {
    frequency: Frequency,
    trust_forwarded_for: bool,
    state: Mutex<State>,
}

impl RateLimiter {
    fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            trust_forwarded_for: false,
            state: Mutex::new(State::default()),
        }
    }

    pub fn per_second(limit: u64) -> Self {
        Self::new(Frequency::Second(limit))
    }

    pub fn per_minute(limit: u64) -> Self {
        Self::new(Frequency::Minute(limit))
    }

    /// Bucket by the `X-Forwarded-For` client instead of the socket peer.
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    /// Count the request, returning true if it's over the limit.
    fn hit(&self, ip: IpAddr, now: Instant) -> bool {
        let window = self.frequency.window();
        let mut guard = self.state.lock();

        // Drop idle clients so the map doesn't grow forever.
        if guard.buckets.len() > 10_000 {
            guard
                .buckets
                .retain(|_, counter| now.duration_since(counter.window_start) < window);
        }

        let counter = guard
            .buckets
            .entry(ip)
            .or_insert_with(|| Counter::new(now));

        if now.duration_since(counter.window_start) >= window {
            counter.counter = 0;
            counter.window_start = now;
        }

        counter.counter += 1;
        counter.counter > self.frequency.limit()
    }
}

#[async_trait]
impl Middleware for RateLimiter {
    async fn handle_request(&self, request: Request) -> Result<Outcome, Error> {
        let addr = if self.trust_forwarded_for {
            request.client_addr()
        } else {
            request.peer().copied()
        };

        let ip = match addr {
            Some(addr) => addr.ip(),
            // Not from a socket, nothing to bucket by.
            None => return Ok(Outcome::Forward(request)),
        };

        // Get current time before locking the mutex.
        let now = Instant::now();

        if self.hit(ip, now) {
            Ok(Outcome::Stop(request, Response::too_many()))
        } else {
            Ok(Outcome::Forward(request))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::http::request::test::request;

    #[tokio::test]
    async fn test_rate_limiter() {
        let limiter = RateLimiter::per_minute(2);

        for _ in 0..2 {
            let request = request("POST", "/contact", &[], "").await.unwrap();
            let outcome = limiter.handle_request(request).await.unwrap();
            assert!(matches!(outcome, Outcome::Forward(_)));
        }

        let third = request("POST", "/contact", &[], "").await.unwrap();
        match limiter.handle_request(third).await.unwrap() {
            Outcome::Stop(_, response) => assert_eq!(response.status().code(), 429),
            Outcome::Forward(_) => panic!("third request should be limited"),
        }

        // Not behind a proxy, the header is the client's to forge.
        let forged = request("POST", "/contact", &[("X-Forwarded-For", "203.0.113.9")], "")
            .await
            .unwrap();
        let outcome = limiter.handle_request(forged).await.unwrap();
        assert!(matches!(outcome, Outcome::Stop(..)));
    }

    #[tokio::test]
    async fn test_trust_forwarded_for() {
        let limiter = RateLimiter::per_minute(1).trust_forwarded_for(true);

        for client in ["203.0.113.9", "203.0.113.10"] {
            let proxied = request("POST", "/contact", &[("X-Forwarded-For", client)], "")
                .await
                .unwrap();
            let outcome = limiter.handle_request(proxied).await.unwrap();
            assert!(matches!(outcome, Outcome::Forward(_)), "{}", client);
        }

        let again = request("POST", "/contact", &[("X-Forwarded-For", "203.0.113.9")], "")
            .await
            .unwrap();
        let outcome = limiter.handle_request(again).await.unwrap();
        assert!(matches!(outcome, Outcome::Stop(..)));
    }

    #[test]
    fn test_window_reset() {
        let limiter = RateLimiter::per_second(1);
        let ip: IpAddr = "192.0.2.1".parse().unwrap();
        let start = Instant::now();

        assert!(!limiter.hit(ip, start));
        assert!(limiter.hit(ip, start));
        assert!(!limiter.hit(ip, start + Duration::from_secs(2)));
    }
}
