use rand::distr::{Alphanumeric, SampleString};
use rand::rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Eight lowercase alphanumerics, e.g. `k3v9x0qa`.
pub fn generate_lobby_id() -> String {
  Alphanumeric
    .sample_string(&mut rng(), 8)
    .to_ascii_lowercase()
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_millis() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|elapsed| elapsed.as_millis() as i64)
    .unwrap_or_default()
}
