/// API key plus an optional user session.
#[derive(Debug, Clone)]
pub struct Credentials {
    anon_key: String,
    session_token: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn new(anon_key: impl Into<String>, session_token: Option<String>) -> Self {
        Self {
            anon_key: anon_key.into(),
            session_token: session_token.filter(|token| !token.trim().is_empty()),
        }
    }

    #[must_use]
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Session token when a user session is available, the anon key otherwise.
    #[must_use]
    pub fn bearer(&self) -> &str {
        self.session_token.as_deref().unwrap_or(&self.anon_key)
    }

    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session_token.is_some()
    }
}
