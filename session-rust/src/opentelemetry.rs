use crate::AuthState;
use opentelemetry::trace::Status;
use std::time::Instant;
use tracing::{info_span, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Span covering one run of the session handshake.
pub struct HandshakeSpan {
    span: Span,
    start_time: Instant,
    key_source: Option<&'static str>,
    validated: bool,
    logged_in: bool,
    outcome: Option<AuthState>,
    ended: bool,
}

impl HandshakeSpan {
    pub fn new(base_url: &str) -> Self {
        let span = info_span!("portfolio_session.authenticate");
        span.set_attribute("server.address", base_url.to_string());

        Self {
            span,
            start_time: Instant::now(),
            key_source: None,
            validated: false,
            logged_in: false,
            outcome: None,
            ended: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    /// `cache` or `network`.
    pub fn on_key_source(&mut self, source: &'static str) {
        self.key_source = Some(source);
    }

    pub fn on_validate(&mut self) {
        self.validated = true;
    }

    pub fn on_login(&mut self) {
        self.logged_in = true;
    }

    pub fn on_error(&mut self, error: &(dyn std::error::Error + 'static)) {
        self.span
            .set_attribute("exception.message", error.to_string());
        self.span.set_status(Status::error(error.to_string()));
    }

    pub fn on_outcome(&mut self, outcome: AuthState) {
        self.outcome = Some(outcome);
    }

    pub fn on_end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        if let Some(key_source) = self.key_source {
            self.span.set_attribute("session.key_source", key_source);
        }

        let path = match (self.validated, self.logged_in) {
            (true, true) => Some("validate_then_login"),
            (true, false) => Some("validate"),
            (false, true) => Some("login"),
            (false, false) => None,
        };
        if let Some(path) = path {
            self.span.set_attribute("session.path", path);
        }

        if let Some(outcome) = self.outcome {
            self.span
                .set_attribute("session.outcome", outcome.as_str());
        }

        self.span.set_attribute(
            "session.duration_seconds",
            self.start_time.elapsed().as_secs_f64(),
        );
    }
}

impl Drop for HandshakeSpan {
    fn drop(&mut self) {
        self.on_end();
    }
}
