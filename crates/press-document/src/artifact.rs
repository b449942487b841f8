//! Output formats and validated artifacts.

use std::fmt;
use std::str::FromStr;

use crate::error::DocumentError;

/// Document format produced by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Pdf,
    Docx,
}

impl OutputFormat {
    /// Every format, in the order `all` renders them.
    pub const ALL: [Self; 2] = [Self::Pdf, Self::Docx];

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    /// Leading bytes every valid file of this format starts with.
    #[must_use]
    pub fn signature(self) -> &'static [u8] {
        match self {
            Self::Pdf => b"%PDF-",
            // DOCX is a ZIP container.
            Self::Docx => b"PK\x03\x04",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Document bytes that passed format validation.
#[derive(Clone, Debug)]
pub struct RenderArtifact {
    bytes: Vec<u8>,
    format: OutputFormat,
    backend: &'static str,
}

impl RenderArtifact {
    /// Accept `bytes` as a `format` document produced by `backend`.
    ///
    /// Empty output and output without the format signature are rejected.
    pub fn validate(
        bytes: Vec<u8>,
        format: OutputFormat,
        backend: &'static str,
    ) -> Result<Self, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::InvalidArtifact {
                format,
                reason: "output is empty",
            });
        }
        if !bytes.starts_with(format.signature()) {
            return Err(DocumentError::InvalidArtifact {
                format,
                reason: "missing file signature",
            });
        }
        Ok(Self {
            bytes,
            format,
            backend,
        })
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Name of the backend that produced the document.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// `{stem}.{extension}` for this artifact's format.
    #[must_use]
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validate_accepts_signatures() {
        let pdf =
            RenderArtifact::validate(b"%PDF-1.7\n...".to_vec(), OutputFormat::Pdf, "x").unwrap();
        assert_eq!(pdf.format(), OutputFormat::Pdf);
        assert_eq!(pdf.backend(), "x");
        assert!(
            RenderArtifact::validate(b"PK\x03\x04rest".to_vec(), OutputFormat::Docx, "x").is_ok()
        );
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = RenderArtifact::validate(Vec::new(), OutputFormat::Pdf, "x").unwrap_err();
        assert_eq!(err.to_string(), "invalid PDF output: output is empty");
    }

    #[test]
    fn test_validate_rejects_wrong_signature() {
        assert!(RenderArtifact::validate(b"PK\x03\x04".to_vec(), OutputFormat::Pdf, "x").is_err());
        assert!(RenderArtifact::validate(b"%PDF-1.4".to_vec(), OutputFormat::Docx, "x").is_err());
        assert!(RenderArtifact::validate(b"<html>".to_vec(), OutputFormat::Pdf, "x").is_err());
    }

    #[test]
    fn test_file_name() {
        let docx =
            RenderArtifact::validate(b"PK\x03\x04".to_vec(), OutputFormat::Docx, "x").unwrap();
        assert_eq!(docx.file_name("report"), "report.docx");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("PDF".parse::<OutputFormat>(), Ok(OutputFormat::Pdf));
        assert_eq!("docx".parse::<OutputFormat>(), Ok(OutputFormat::Docx));
        assert!("odt".parse::<OutputFormat>().is_err());
    }
}
