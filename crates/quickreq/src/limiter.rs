//! Connection ceilings shared by every caller of one client
//!
//! `reqwest` reuses idle connections but never refuses to open a new one, so
//! each exchange first takes a permit here. A permit counts against the total
//! and against its route until it is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use url::Url;

/// Bounds in-flight exchanges in total and per route (`scheme://host:port`)
#[derive(Debug)]
pub struct ConnectionLimiter {
    max_total: usize,
    max_per_route: usize,
    state: Mutex<LimiterState>,
    waiter: Condvar,
}

#[derive(Debug, Default)]
struct LimiterState {
    total: usize,
    per_route: HashMap<String, usize>,
}

/// Slot held for the duration of one exchange
#[derive(Debug)]
pub struct ConnectionPermit {
    route: String,
    limiter: Arc<ConnectionLimiter>,
}

impl ConnectionLimiter {
    /// Create a limiter; ceilings below one are raised to one
    pub fn new(max_total: usize, max_per_route: usize) -> Arc<Self> {
        Arc::new(Self {
            max_total: max_total.max(1),
            max_per_route: max_per_route.max(1),
            state: Mutex::default(),
            waiter: Condvar::new(),
        })
    }

    /// Ceiling across all routes
    pub fn max_total(&self) -> usize {
        self.max_total
    }

    /// Ceiling for a single route
    pub fn max_per_route(&self) -> usize {
        self.max_per_route
    }

    /// Block until `route` has room, then take a slot
    pub fn acquire(self: &Arc<Self>, route: &str) -> ConnectionPermit {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            let route_in_use = state.per_route.get(route).copied().unwrap_or_default();
            if state.total < self.max_total && route_in_use < self.max_per_route {
                state.total += 1;
                state.per_route.insert(route.to_string(), route_in_use + 1);
                break;
            }
            state = self
                .waiter
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        ConnectionPermit {
            route: route.to_string(),
            limiter: Arc::clone(self),
        }
    }

    /// Exchanges currently holding a permit
    pub fn in_use(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total
    }

    fn release(&self, route: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.total = state.total.saturating_sub(1);
        if let Some(count) = state.per_route.get_mut(route) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                state.per_route.remove(route);
            }
        }
        drop(state);

        // Waiters may be blocked on different routes
        self.waiter.notify_all();
    }
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.limiter.release(&self.route);
    }
}

/// Route key for `url`: scheme, host and effective port
pub fn route_key(url: &Url) -> String {
    format!(
        "{}://{}:{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.port_or_known_default().unwrap_or_default()
    )
}
