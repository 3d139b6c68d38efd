//! Canonical test configurations.
//!
//! Single source of truth for the keys every test configuration needs.

use std::collections::HashMap;

use crate::infrastructure::config::Config;

/// 32-byte encryption key accepted by the credential cipher.
pub const TEST_ENCRYPTION_KEY: &str = "0123456789abcdef0123456789abcdef";

pub const TEST_TELEGRAM_TOKEN: &str = "123456:test-token";

/// Required keys filled with test values, overridden by `pairs`.
pub fn lookup_from_pairs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    let mut values = HashMap::from([
        ("TELEGRAM_TOKEN".to_string(), TEST_TELEGRAM_TOKEN.to_string()),
        ("ENCRYPTION_KEY".to_string(), TEST_ENCRYPTION_KEY.to_string()),
    ]);
    for (key, value) in pairs {
        values.insert((*key).to_string(), (*value).to_string());
    }
    values
}

/// Validated configuration built from test defaults plus `pairs`.
///
/// # Panics
///
/// Panics if the resulting configuration is invalid.
pub fn config_from_pairs(pairs: &[(&str, &str)]) -> Config {
    let values = lookup_from_pairs(pairs);
    Config::from_lookup(|key| values.get(key).cloned()).expect("test configuration is valid")
}
