use crate::{SessionError, SessionResult};
use std::{env, fmt, time::Duration};

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const USERNAME_ENV: &str = "USERNAME";
pub const PASSWORD_ENV: &str = "PASSWORD";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";

/// Options for connecting to the portfolio API.
/// # Default Values
/// - `username`: `None`
/// - `password`: `None`
/// - `timeout`: `None` (requests may wait forever)
#[derive(Clone, Default)]
pub struct SessionOptions {
    /// API origin, e.g. `https://api.example.com`. Endpoint paths are
    /// appended to it.
    pub base_url: String,
    pub credentials: Credentials,
    /// Per-request timeout applied to the HTTP client.
    pub timeout: Option<Duration>,
}

impl SessionOptions {
    #[must_use]
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read options from `BASE_URL`, `USERNAME`, `PASSWORD` and the optional
    /// `REQUEST_TIMEOUT_SECS`. Blank values count as unset.
    ///
    /// Missing credentials are not an error here; the handshake fails
    /// later without touching the login endpoint.
    pub fn from_env() -> SessionResult<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same rules as [`SessionOptions::from_env`], reading each variable
    /// through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> SessionResult<Self> {
        let non_empty = |name: &str| {
            var(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_url = non_empty(BASE_URL_ENV).ok_or_else(|| {
            SessionError::Invariant("options", format!("{BASE_URL_ENV} must be set"))
        })?;

        let timeout = match non_empty(REQUEST_TIMEOUT_ENV) {
            Some(value) => Some(Duration::from_secs(value.parse().map_err(|_| {
                SessionError::Invariant(
                    "options",
                    format!("{REQUEST_TIMEOUT_ENV} must be a whole number of seconds, got {value:?}"),
                )
            })?)),
            None => None,
        };

        Ok(Self {
            base_url,
            credentials: Credentials {
                username: non_empty(USERNAME_ENV),
                password: non_empty(PASSWORD_ENV),
            },
            timeout,
        })
    }

    /// Join an endpoint path onto the base URL without doubling slashes.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The fixed service-account pair used for the login call.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Both values, or `MissingCredentials` naming the first one absent.
    pub fn require(&self) -> SessionResult<(&str, &str)> {
        let username = self
            .username
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or(SessionError::MissingCredentials("username"))?;
        let password = self
            .password
            .as_deref()
            .filter(|value| !value.is_empty())
            .ok_or(SessionError::MissingCredentials("password"))?;
        Ok((username, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn from_vars_reads_all_values() {
        let options = SessionOptions::from_vars(vars(&[
            (BASE_URL_ENV, " http://localhost:8080 "),
            (USERNAME_ENV, "svc"),
            (PASSWORD_ENV, "pw"),
            (REQUEST_TIMEOUT_ENV, "15"),
        ]))
        .unwrap();
        assert_eq!(options.base_url, "http://localhost:8080");
        assert_eq!(options.credentials, Credentials::new("svc", "pw"));
        assert_eq!(options.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn from_vars_requires_base_url() {
        for pairs in [&[][..], &[(BASE_URL_ENV, "   ")][..]] {
            let result = SessionOptions::from_vars(vars(pairs));
            assert!(matches!(result, Err(SessionError::Invariant("options", _))));
        }
    }

    #[test]
    fn from_vars_allows_missing_or_blank_credentials() {
        let options = SessionOptions::from_vars(vars(&[
            (BASE_URL_ENV, "http://x"),
            (USERNAME_ENV, ""),
            (PASSWORD_ENV, "  "),
        ]))
        .unwrap();
        assert_eq!(options.credentials, Credentials::default());
        assert!(matches!(
            options.credentials.require(),
            Err(SessionError::MissingCredentials("username"))
        ));
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn from_vars_rejects_bad_timeout() {
        let result = SessionOptions::from_vars(vars(&[
            (BASE_URL_ENV, "http://x"),
            (REQUEST_TIMEOUT_ENV, "soon"),
        ]));
        assert!(matches!(result, Err(SessionError::Invariant("options", _))));

        let options = SessionOptions::from_vars(vars(&[
            (BASE_URL_ENV, "http://x"),
            (REQUEST_TIMEOUT_ENV, " "),
        ]))
        .unwrap();
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn require_rejects_missing_or_empty_values() {
        assert!(matches!(
            Credentials::default().require(),
            Err(SessionError::MissingCredentials("username"))
        ));
        assert!(matches!(
            Credentials::new("svc", "").require(),
            Err(SessionError::MissingCredentials("password"))
        ));
        assert!(matches!(
            Credentials::new("", "pw").require(),
            Err(SessionError::MissingCredentials("username"))
        ));
        assert_eq!(Credentials::new("svc", "pw").require().unwrap(), ("svc", "pw"));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let options = SessionOptions::new("http://localhost:8080/", Credentials::default());
        assert_eq!(
            options.endpoint("/api/v1/auth/login"),
            "http://localhost:8080/api/v1/auth/login"
        );
        let options = SessionOptions::new("http://localhost:8080", Credentials::default());
        assert_eq!(
            options.endpoint("api/v1/auth/login"),
            "http://localhost:8080/api/v1/auth/login"
        );
    }

    #[test]
    fn debug_redacts_password() {
        let options = SessionOptions::new("http://x", Credentials::new("svc", "secret"));
        let rendered = format!("{options:?}");
        assert!(rendered.contains("svc"));
        assert!(!rendered.contains("secret"));
    }
}
