use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Reads `ENVIRONMENT`, treating anything unrecognised as development.
    pub fn from_env() -> Self {
        env::var("ENVIRONMENT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `development` or `production`.",
                other
            )),
        }
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or does not parse. Unparseable values are logged so typos don't go unnoticed.
pub fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring malformed environment value");
                default
            }
        },
        Err(_) => default,
    }
}

/// Non-empty string environment variable.
pub fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn parses_known_environments() {
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("PROD".parse(), Ok(Environment::Production));
        assert_eq!(" dev ".parse(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    #[serial]
    fn from_env_defaults_to_development() {
        unsafe { env::remove_var("ENVIRONMENT") };
        assert_eq!(Environment::from_env(), Environment::Development);

        unsafe { env::set_var("ENVIRONMENT", "staging") };
        assert_eq!(Environment::from_env(), Environment::Development);

        unsafe { env::set_var("ENVIRONMENT", "production") };
        assert_eq!(Environment::from_env(), Environment::Production);

        unsafe { env::remove_var("ENVIRONMENT") };
    }

    #[test]
    #[serial]
    fn env_or_falls_back_on_missing_or_malformed() {
        unsafe { env::remove_var("COMMON_TEST_PORT") };
        assert_eq!(env_or("COMMON_TEST_PORT", 8000u16), 8000);

        unsafe { env::set_var("COMMON_TEST_PORT", "not-a-port") };
        assert_eq!(env_or("COMMON_TEST_PORT", 8000u16), 8000);

        unsafe { env::set_var("COMMON_TEST_PORT", " 9100 ") };
        assert_eq!(env_or("COMMON_TEST_PORT", 8000u16), 9100);

        unsafe { env::remove_var("COMMON_TEST_PORT") };
    }

    #[test]
    #[serial]
    fn env_non_empty_ignores_blank_values() {
        unsafe { env::set_var("COMMON_TEST_SECRET", "   ") };
        assert_eq!(env_non_empty("COMMON_TEST_SECRET"), None);

        unsafe { env::set_var("COMMON_TEST_SECRET", "abc123") };
        assert_eq!(env_non_empty("COMMON_TEST_SECRET").as_deref(), Some("abc123"));

        unsafe { env::remove_var("COMMON_TEST_SECRET") };
    }
}
