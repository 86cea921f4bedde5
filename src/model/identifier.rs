use std::fmt;
use std::str::FromStr;

use crate::error::HubError;

/// Owner placeholder meaning "the tenant the API key belongs to".
pub const SELF_OWNER: &str = "-";

pub const LATEST_COMMIT: &str = "latest";

/// A parsed `owner/repo:commit` prompt reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptIdentifier {
    pub owner: String,
    pub repo: String,
    pub commit: String,
}

impl PromptIdentifier {
    pub fn parse(identifier: &str) -> Result<Self, HubError> {
        let invalid = || HubError::InvalidIdentifier {
            identifier: identifier.to_string(),
        };

        if identifier.is_empty()
            || identifier.split('/').count() > 2
            || identifier.starts_with('/')
            || identifier.ends_with('/')
            || identifier.split(':').count() > 2
        {
            return Err(invalid());
        }

        let (name_part, commit) = match identifier.split_once(':') {
            Some((name, commit)) if !commit.is_empty() => (name, commit),
            Some((name, _)) => (name, LATEST_COMMIT),
            None => (identifier, LATEST_COMMIT),
        };

        let (owner, repo) = match name_part.split_once('/') {
            Some((owner, repo)) => (owner, repo),
            None => (SELF_OWNER, name_part),
        };
        if owner.is_empty() || repo.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            commit: commit.to_string(),
        })
    }

    /// `owner/repo`, as used in API paths.
    pub fn repo_path(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn is_latest(&self) -> bool {
        self.commit == LATEST_COMMIT
    }

    pub fn short_commit(&self) -> &str {
        match self.commit.char_indices().nth(8) {
            Some((idx, _)) => &self.commit[..idx],
            None => &self.commit,
        }
    }

    pub fn with_commit(&self, commit: impl Into<String>) -> Self {
        Self {
            commit: commit.into(),
            ..self.clone()
        }
    }
}

impl FromStr for PromptIdentifier {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PromptIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.commit)
    }
}
