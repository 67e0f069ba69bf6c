//! Git repository URL parsing and provider detection.
//!
//! Both the webhook clients and the EventListener builder need to know which
//! provider hosts a repository and what its `owner/name` path is. The parsing
//! lives here so the two agree.

use thiserror::Error;

/// Errors produced while parsing a repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoUrlError {
    /// The URL does not start with `http://` or `https://`.
    #[error("Repository URL '{0}' must use http or https")]
    UnsupportedScheme(String),

    /// The URL has no host component.
    #[error("Repository URL '{0}' has no host")]
    MissingHost(String),

    /// The URL path does not contain at least `owner/name`.
    #[error("Repository URL '{0}' does not name a repository")]
    MissingPath(String),
}

/// Git hosting providers with a webhook driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitProvider {
    /// github.com or GitHub Enterprise.
    GitHub,
    /// gitlab.com or a self-managed GitLab.
    GitLab,
}

impl GitProvider {
    /// Detects the provider from a repository host name.
    ///
    /// `github.com` and hosts containing `github` map to GitHub; hosts
    /// containing `gitlab` map to GitLab. Anything else is unknown.
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.to_ascii_lowercase();
        if host.contains("github") {
            Some(Self::GitHub)
        } else if host.contains("gitlab") {
            Some(Self::GitLab)
        } else {
            None
        }
    }

    /// Parses a driver name as accepted on the command line.
    pub fn from_driver(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "github" => Some(Self::GitHub),
            "gitlab" => Some(Self::GitLab),
            _ => None,
        }
    }
}

impl std::fmt::Display for GitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "github"),
            Self::GitLab => write!(f, "gitlab"),
        }
    }
}

/// A parsed `http(s)://host/owner/name[.git]` repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryUrl {
    raw: String,
    host: String,
    path: String,
}

impl RepositoryUrl {
    /// Parses a repository URL.
    ///
    /// A trailing `.git` suffix and trailing slashes are stripped from the
    /// path. The path must have at least two segments.
    pub fn parse(raw: &str) -> Result<Self, RepoUrlError> {
        let rest = raw
            .strip_prefix("https://")
            .or_else(|| raw.strip_prefix("http://"))
            .ok_or_else(|| RepoUrlError::UnsupportedScheme(raw.to_string()))?;

        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        // Drop any `user:password@` prefix.
        let host = authority.rsplit('@').next().unwrap_or(authority);
        if host.is_empty() {
            return Err(RepoUrlError::MissingHost(raw.to_string()));
        }

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        if path.split('/').filter(|s| !s.is_empty()).count() < 2 {
            return Err(RepoUrlError::MissingPath(raw.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    /// Returns the URL exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the host, including any port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the repository path (e.g. `"org/repo"`), without `.git`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the provider detected from the host, if any.
    pub fn provider(&self) -> Option<GitProvider> {
        GitProvider::from_host(&self.host)
    }
}

impl std::fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
