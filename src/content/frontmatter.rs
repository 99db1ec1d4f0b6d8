//! Frontmatter splitting and parsing.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parsed document frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Document owner's name, rendered as the header title
    #[serde(default)]
    pub name: Option<String>,

    /// Header line items (contact details and the like)
    #[serde(default)]
    pub header: Vec<HeaderItem>,
}

/// One item of the header line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderItem {
    /// Display text
    pub text: String,

    /// Optional link target
    #[serde(default)]
    pub link: Option<String>,
}

impl Frontmatter {
    /// Parse YAML frontmatter.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Check if there is nothing to render in the header.
    pub fn is_empty(&self) -> bool {
        self.name.as_deref().map_or(true, |n| n.trim().is_empty()) && self.header.is_empty()
    }
}

/// A document source split into frontmatter and markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSource<'a> {
    /// Raw YAML between the `---` fences, if present
    pub frontmatter: Option<&'a str>,
    /// Markdown body
    pub body: &'a str,
}

/// Split `source` into its `---` fenced frontmatter and the body.
///
/// The opening fence must be the first line. A missing closing fence is an
/// error rather than silently treating the whole document as YAML.
pub fn split_frontmatter(source: &str) -> Result<SplitSource<'_>> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return Ok(SplitSource {
            frontmatter: None,
            body: source,
        });
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Ok(SplitSource {
                frontmatter: Some(&rest[..offset]),
                body: &rest[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(Error::Frontmatter(
        "missing closing `---` after frontmatter".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_frontmatter() {
        let source = "---\nname: Jane\n---\n# Body\n";
        let split = split_frontmatter(source).unwrap();
        assert_eq!(split.frontmatter, Some("name: Jane\n"));
        assert_eq!(split.body, "# Body\n");
    }

    #[test]
    fn test_split_without_frontmatter() {
        let split = split_frontmatter("# Title\n---\n").unwrap();
        assert_eq!(split.frontmatter, None);
        assert_eq!(split.body, "# Title\n---\n");
    }

    #[test]
    fn test_split_unclosed_frontmatter() {
        assert!(matches!(
            split_frontmatter("---\nname: Jane\n"),
            Err(Error::Frontmatter(_))
        ));
    }

    #[test]
    fn test_parse_frontmatter() {
        let yaml = "name: Jane Doe\nheader:\n  - text: jane@example.com\n    link: mailto:jane@example.com\n  - text: Berlin\n";
        let fm = Frontmatter::parse(yaml).unwrap();
        assert_eq!(fm.name.as_deref(), Some("Jane Doe"));
        assert_eq!(fm.header.len(), 2);
        assert_eq!(fm.header[0].link.as_deref(), Some("mailto:jane@example.com"));
        assert_eq!(fm.header[1].link, None);
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert!(Frontmatter::parse("").unwrap().is_empty());
        assert!(Frontmatter::parse("header: [").is_err());
    }
}
