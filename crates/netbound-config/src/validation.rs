use netbound_utils::ConfigError;

use crate::Config;

/// Upper bound for any millisecond setting (one hour)
const MAX_MILLIS: u64 = 3_600_000;

impl Config {
    /// Validate configuration values.
    ///
    /// All problems are collected; a single problem is reported as
    /// `InvalidValue`, several as `ValidationFailed`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems: Vec<(String, String)> = Vec::new();

        for (key, value) in [
            ("network.timeout_ms", self.network.timeout_ms),
            ("network.probe_timeout_ms", self.network.probe_timeout_ms),
            ("api.request_timeout_ms", self.api.request_timeout_ms),
        ] {
            if value == 0 {
                problems.push((key.to_string(), "must be greater than 0".to_string()));
            } else if value > MAX_MILLIS {
                problems.push((
                    key.to_string(),
                    format!("exceeds maximum limit of {MAX_MILLIS} ms"),
                ));
            }
        }

        if self.network.startup_delay_ms >= self.network.timeout_ms && self.network.timeout_ms > 0
        {
            problems.push((
                "network.startup_delay_ms".to_string(),
                "must be shorter than network.timeout_ms".to_string(),
            ));
        }

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            problems.push((
                "api.base_url".to_string(),
                format!("'{url}' is not an http(s) URL"),
            ));
        }

        if let Some(addr) = &self.network.probe_addr
            && !addr.rsplit_once(':').is_some_and(|(host, port)| {
                !host.is_empty() && port.parse::<u16>().is_ok()
            })
        {
            problems.push((
                "network.probe_addr".to_string(),
                format!("'{addr}' is not host:port"),
            ));
        }

        match problems.len() {
            0 => Ok(()),
            1 => {
                let (key, value) = problems.remove(0);
                Err(ConfigError::InvalidValue { key, value })
            }
            n => Err(ConfigError::ValidationFailed {
                errors: problems
                    .into_iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect(),
                error_count: n,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.network.timeout_ms = 0;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "network.timeout_ms"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_delay_must_be_shorter_than_timeout() {
        let mut config = Config::default();
        config.network.startup_delay_ms = config.network.timeout_ms;
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "network.startup_delay_ms");
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_problems_are_collected() {
        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        config.network.probe_addr = Some("no-port".to_string());
        match config.validate() {
            Err(ConfigError::ValidationFailed {
                errors,
                error_count,
            }) => {
                assert_eq!(error_count, 2);
                assert!(errors[0].starts_with("api.base_url"));
                assert!(errors[1].starts_with("network.probe_addr"));
            }
            other => panic!("Expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_probe_addr_with_port_accepted() {
        let mut config = Config::default();
        config.network.probe_addr = Some("open-api.xyz:443".to_string());
        config.validate().unwrap();
    }

    proptest! {
        #[test]
        fn prop_any_positive_timeout_above_delay_is_valid(
            timeout in 1u64..=MAX_MILLIS,
            delay_fraction in 0u64..100,
        ) {
            let mut config = Config::default();
            config.network.timeout_ms = timeout;
            config.network.startup_delay_ms = timeout * delay_fraction / 100;
            prop_assume!(config.network.startup_delay_ms < timeout);
            prop_assert!(config.validate().is_ok());
        }
    }
}
