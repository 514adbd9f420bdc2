use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::Config;
use crate::models::UserId;

/// Who is looking at the view
pub trait Session: Send + Sync {
    fn user_id(&self) -> Option<UserId>;

    fn login_token(&self) -> Option<String>;
}

/// Session fixed at startup, e.g. from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user_id: Option<UserId>,
    token: Option<String>,
}

impl StaticSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            token: Some(token.into()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            user_id: config.user_id,
            token: config.token.clone(),
        }
    }
}

impl Session for StaticSession {
    fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    fn login_token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Part of the detail screen that can be revealed or scrolled to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Info,
    Reviews,
    Transactions,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Info => "info",
            Section::Reviews => "reviews",
            Section::Transactions => "transactions",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Section::Info),
            "reviews" => Ok(Section::Reviews),
            "transactions" => Ok(Section::Transactions),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

/// Where the view can send the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The visitor's own transactions
    Transactions,
    /// Conversation with another user
    Messages { user_id: UserId },
}

/// Rendering side of the view: navigation and scrolling
pub trait ViewHost: Send + Sync {
    fn navigate(&self, route: Route);

    fn scroll_into_view(&self, section: Section);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_parse() {
        assert_eq!("reviews".parse::<Section>().unwrap(), Section::Reviews);
        assert_eq!(Section::Transactions.to_string(), "transactions");
        assert!("settings".parse::<Section>().is_err());
    }

    #[test]
    fn test_session_from_config() {
        let session = StaticSession::from_config(&Config::default().with_login(4, "t0k"));
        assert_eq!(session.user_id(), Some(4));
        assert_eq!(session.login_token().as_deref(), Some("t0k"));

        let anonymous = StaticSession::anonymous();
        assert!(anonymous.user_id().is_none());
    }
}
