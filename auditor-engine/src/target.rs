//! Audit target identity and the context handed to checks

use crate::error::AuditError;
use serde::{Deserialize, Serialize};

/// What is being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    WebPage,
    LocalBusiness,
    Content,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::WebPage => "web_page",
            TargetKind::LocalBusiness => "local_business",
            TargetKind::Content => "content",
        }
    }
}

/// Identity of an audited entity as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetIdentity {
    pub kind: TargetKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Body text for content audits; never serialized into reports
    #[serde(default, skip_serializing)]
    pub content: Option<String>,
}

impl TargetIdentity {
    pub fn web_page(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::WebPage,
            name: name.into(),
            domain: Some(domain.into()),
            location: None,
            keywords: Vec::new(),
            content: None,
        }
    }

    pub fn local_business(
        name: impl Into<String>,
        domain: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            kind: TargetKind::LocalBusiness,
            name: name.into(),
            domain: Some(domain.into()),
            location: Some(location.into()),
            keywords: Vec::new(),
            content: None,
        }
    }

    pub fn content(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Content,
            name: name.into(),
            domain: None,
            location: None,
            keywords: Vec::new(),
            content: Some(body.into()),
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and normalize into the context checks run against
    ///
    /// Fails when the name is blank, when a web page or local business has no
    /// usable domain, or when a local business has no location.
    pub fn resolve(&self) -> Result<TargetContext, AuditError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AuditError::InvalidTarget("name must not be empty".to_string()));
        }

        let location = self
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        let needs_domain = matches!(self.kind, TargetKind::WebPage | TargetKind::LocalBusiness);
        let site = match self.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Some(normalize_site(raw)?),
            None if needs_domain => {
                return Err(AuditError::InvalidTarget(format!(
                    "{} target requires a domain",
                    self.kind.as_str()
                )))
            }
            None => None,
        };

        if self.kind == TargetKind::LocalBusiness && location.is_none() {
            return Err(AuditError::InvalidTarget(
                "local_business target requires a location".to_string(),
            ));
        }

        let mut keywords: Vec<String> = self
            .keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            keywords.push(match &location {
                Some(loc) => format!("{} {}", name, loc),
                None => name.to_string(),
            });
        }

        let identity = TargetIdentity {
            kind: self.kind,
            name: name.to_string(),
            domain: site.as_ref().map(|s| s.domain.clone()),
            location,
            keywords,
            content: self.content.clone(),
        };

        Ok(TargetContext {
            base_url: site.map(|s| s.base_url),
            identity,
        })
    }
}

/// Normalized target handed to every check
#[derive(Debug, Clone, PartialEq)]
pub struct TargetContext {
    pub identity: TargetIdentity,
    /// Scheme plus host, e.g. `https://example.com`
    pub base_url: Option<String>,
}

impl TargetContext {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn domain(&self) -> Option<&str> {
        self.identity.domain.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.identity.location.as_deref()
    }

    pub fn keywords(&self) -> &[String] {
        &self.identity.keywords
    }

    /// First keyword; dependent checks such as competitor lookups key on it
    pub fn primary_keyword(&self) -> &str {
        self.identity
            .keywords
            .first()
            .map(String::as_str)
            .unwrap_or(&self.identity.name)
    }

    pub fn content(&self) -> Option<&str> {
        self.identity.content.as_deref()
    }
}

struct Site {
    domain: String,
    base_url: String,
}

fn normalize_site(raw: &str) -> Result<Site, AuditError> {
    let lower = raw.to_ascii_lowercase();
    let (scheme, rest) = if let Some(rest) = lower.strip_prefix("https://") {
        ("https", rest)
    } else if let Some(rest) = lower.strip_prefix("http://") {
        ("http", rest)
    } else {
        ("https", lower.as_str())
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    if host.is_empty() || host.chars().any(char::is_whitespace) || !host.contains('.') {
        return Err(AuditError::InvalidTarget(format!("invalid domain '{}'", raw)));
    }
    if host.starts_with('.') || host.ends_with('.') {
        return Err(AuditError::InvalidTarget(format!("invalid domain '{}'", raw)));
    }

    Ok(Site {
        domain: host.to_string(),
        base_url: format!("{}://{}", scheme, host),
    })
}
