//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod fakes;

use serialscope::Session;
use std::time::{Duration, Instant};

/// How long integration tests wait for the backend to reach a state
pub const WAIT_DEADLINE: Duration = Duration::from_secs(2);

/// Poll the session until `cond` holds, or panic after the deadline
pub fn wait_for(session: &mut Session, what: &str, mut cond: impl FnMut(&Session) -> bool) {
    let start = Instant::now();
    loop {
        session.poll_messages();
        if cond(session) {
            return;
        }
        if start.elapsed() > WAIT_DEADLINE {
            panic!(
                "timed out waiting for {} (status: {}, stats: {:?})",
                what,
                session.status(),
                session.stats()
            );
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
