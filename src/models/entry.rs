//! Feed entry model and filename derivation.

use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, Result};

/// File extension appended to every derived filename
pub const PDF_EXTENSION: &str = ".pdf";

/// One record of the search feed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Canonical identifier (Atom `id`), empty when the feed omits it
    pub id: String,

    /// Paper title, if present
    pub title: Option<String>,

    /// `href` of the link whose `title` is `pdf`
    pub pdf_link: Option<String>,
}

impl FeedEntry {
    /// Create an entry with just an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the PDF link
    pub fn pdf_link(mut self, link: impl Into<String>) -> Self {
        self.pdf_link = Some(link.into());
        self
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The PDF link, or [`LoaderError::MissingLink`] naming this entry.
    pub fn require_pdf_link(&self) -> Result<&str> {
        self.pdf_link
            .as_deref()
            .filter(|link| !link.is_empty())
            .ok_or_else(|| LoaderError::MissingLink {
                id: self.id.clone(),
            })
    }

    /// Filesystem-safe filename for this entry's document.
    pub fn filename(&self) -> String {
        derive_filename(&self.id)
    }
}

/// Derive a filesystem-safe `.pdf` filename from an identifier.
///
/// `:` and the substring `http` are removed, every `.` and `/` becomes `_`,
/// and a run of those separators yields a single `_`. Identifiers that only
/// differ in the length of such a run collide: `a..b` and `a.b` both map to
/// `a_b.pdf`.
///
/// ```
/// use arxiv_loader::models::derive_filename;
///
/// assert_eq!(
///     derive_filename("http://arxiv.org/abs/1234.5678"),
///     "_arxiv_org_abs_1234_5678.pdf"
/// );
/// ```
pub fn derive_filename(id: &str) -> String {
    let stripped = id.replace(':', "").replace("http", "");

    let mut name = String::with_capacity(stripped.len() + PDF_EXTENSION.len());
    let mut in_separator = false;
    for c in stripped.chars() {
        if c == '.' || c == '/' {
            if !in_separator {
                name.push('_');
            }
            in_separator = true;
        } else {
            name.push(c);
            in_separator = false;
        }
    }

    name.push_str(PDF_EXTENSION);
    name
}
