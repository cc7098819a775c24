//! Routing metrics.
//!
//! # Metrics
//! - `router_matches_total` (counter): forward lookups by `outcome`
//!   (`matched`, `intentional_404`, `no_match`)
//! - `router_reverse_total` (counter): reverse lookups by `outcome`
//!   (`found`, `not_found`)
//! - `router_rebuilds_total` (counter): table rebuilds by `result` (`ok`, `error`)
//! - `router_routes` (gauge): routes in the active table

pub fn record_match(outcome: &'static str) {
    ::metrics::counter!("router_matches_total", "outcome" => outcome).increment(1);
}

pub fn record_reverse(outcome: &'static str) {
    ::metrics::counter!("router_reverse_total", "outcome" => outcome).increment(1);
}

/// `routes` is the size of the table serving requests after the attempt.
pub fn record_rebuild(result: &'static str, routes: usize) {
    ::metrics::counter!("router_rebuilds_total", "result" => result).increment(1);
    ::metrics::gauge!("router_routes").set(routes as f64);
}
