//! API utility functions
//!
//! Pure, stateless helpers for HTTP request and response processing.

use crate::api::error::ApiError;

/// Parses and validates a Content-Type header for a raw PDF upload
///
/// Accepts `application/pdf` (parameters allowed). Rejects everything else,
/// including malformed media types.
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        ApiError::InvalidPayload(format!("invalid Content-Type: {}", content_type))
    })?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::PDF {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be application/pdf, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Content-Type used when serving an artifact back
pub fn artifact_content_type(filename: &str) -> mime::Mime {
    let is_pdf = filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        mime::APPLICATION_PDF
    } else {
        mime::APPLICATION_OCTET_STREAM
    }
}

/// `attachment; filename="..."` with quotes and control characters stripped
pub fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_type_valid() {
        assert!(parse_content_type("application/pdf").is_ok());
        assert!(parse_content_type("application/pdf; name=a.pdf").is_ok());
    }

    #[test]
    fn test_parse_content_type_invalid() {
        assert!(parse_content_type("application/json").is_err());
        assert!(parse_content_type("application/x-pdf-ish").is_err());
        assert!(parse_content_type("text/plain").is_err());
        assert!(parse_content_type("invalid").is_err());
        assert!(parse_content_type("").is_err());
    }

    #[test]
    fn test_artifact_content_type() {
        assert_eq!(artifact_content_type("merged_1.pdf"), mime::APPLICATION_PDF);
        assert_eq!(artifact_content_type("MERGED_1.PDF"), mime::APPLICATION_PDF);
        assert_eq!(
            artifact_content_type("notes.txt"),
            mime::APPLICATION_OCTET_STREAM
        );
        assert_eq!(artifact_content_type("noext"), mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn test_content_disposition_strips_quotes() {
        assert_eq!(
            content_disposition("a\"b.pdf"),
            "attachment; filename=\"ab.pdf\""
        );
    }
}
