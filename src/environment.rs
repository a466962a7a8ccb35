use std::env;

pub const API_URL_VAR: &str = "BIASLENS_API_URL";
pub const PORT_VAR: &str = "BIASLENS_PORT";
pub const LOG_DIR_VAR: &str = "BIASLENS_LOG_DIR";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the analysis backend.
    pub api_url: String,
    /// Port the web front-end listens on.
    pub port: u16,
    pub log_dir: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds settings from an arbitrary variable lookup. Empty values count
    /// as unset and an unparsable port falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            api_url: get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            port: get(PORT_VAR)
                .and_then(|port| port.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            log_dir: get(LOG_DIR_VAR).unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.log_dir, DEFAULT_LOG_DIR);
    }

    #[test]
    fn test_overrides_and_bad_port() {
        let settings = Settings::from_lookup(lookup(&[
            (API_URL_VAR, " https://bias.example.com "),
            (PORT_VAR, "not-a-port"),
            (LOG_DIR_VAR, ""),
        ]));
        assert_eq!(settings.api_url, "https://bias.example.com");
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.log_dir, DEFAULT_LOG_DIR);

        let settings = Settings::from_lookup(lookup(&[(PORT_VAR, "9090")]));
        assert_eq!(settings.port, 9090);
    }
}
