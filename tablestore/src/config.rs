use serde::{Deserialize, Serialize};

/// Connection settings for the hosted store, typically read from the
/// application's TOML configuration file.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct StoreConfiguration {
    /// Base URL of the store instance, e.g. `https://xyz.example.co` or the
    /// local development endpoint `http://localhost:54321`.
    pub url: String,
    pub api_key: String,
}
