//! Audit categories and profiles
//!
//! Categories are a closed set so that scores are keyed by a checked enum
//! instead of free-form strings. The JSON form is the snake_case name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named group of related checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Local business audit
    Onpage,
    Gbp,
    Citations,
    Reviews,
    Content,
    Backlinks,
    Competitors,
    Technical,
    // Page (technical) audit
    Crawlability,
    Performance,
    Security,
    Mobile,
    ContentQuality,
    Indexability,
    // Written content audit
    Readability,
    Seo,
    Uniqueness,
    Headings,
    Length,
}

impl Category {
    pub const ALL: [Category; 19] = [
        Category::Onpage,
        Category::Gbp,
        Category::Citations,
        Category::Reviews,
        Category::Content,
        Category::Backlinks,
        Category::Competitors,
        Category::Technical,
        Category::Crawlability,
        Category::Performance,
        Category::Security,
        Category::Mobile,
        Category::ContentQuality,
        Category::Indexability,
        Category::Readability,
        Category::Seo,
        Category::Uniqueness,
        Category::Headings,
        Category::Length,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Onpage => "onpage",
            Category::Gbp => "gbp",
            Category::Citations => "citations",
            Category::Reviews => "reviews",
            Category::Content => "content",
            Category::Backlinks => "backlinks",
            Category::Competitors => "competitors",
            Category::Technical => "technical",
            Category::Crawlability => "crawlability",
            Category::Performance => "performance",
            Category::Security => "security",
            Category::Mobile => "mobile",
            Category::ContentQuality => "content_quality",
            Category::Indexability => "indexability",
            Category::Readability => "readability",
            Category::Seo => "seo",
            Category::Uniqueness => "uniqueness",
            Category::Headings => "headings",
            Category::Length => "length",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Which kind of audit is being run; selects the built-in weight map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditProfile {
    /// Local business presence (website, business profile, citations, reviews)
    LocalBusiness,
    /// Technical audit of a web page / site
    Page,
    /// Quality audit of one unit of written content
    Content,
}

impl AuditProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditProfile::LocalBusiness => "local_business",
            AuditProfile::Page => "page",
            AuditProfile::Content => "content",
        }
    }
}

impl fmt::Display for AuditProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
