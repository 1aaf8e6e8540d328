use axum::http::HeaderMap;
use thiserror::Error;

use super::models::SplitParams;
use crate::pdf::PageRange;

pub const PASSPHRASE_HEADER: &str = "X-Pdfdesk-Passphrase";

#[derive(Debug, Error)]
pub enum RequestValidationError {
    #[error("invalid page range {start}-{end}: pages are 1-based and start must not exceed end")]
    InvalidRange { start: u32, end: u32 },
    #[error("page order must be a comma-separated list of page indices")]
    EmptyOrder,
    #[error("invalid page index '{0}'")]
    InvalidPageIndex(String),
    #[error("{PASSPHRASE_HEADER} header is required")]
    MissingPassphrase,
}

pub fn validate_split(params: &SplitParams) -> Result<PageRange, RequestValidationError> {
    PageRange::new(params.start, params.end).map_err(|_| RequestValidationError::InvalidRange {
        start: params.start,
        end: params.end,
    })
}

/// Parses `"2,0,1"` into 0-based page indices
pub fn parse_page_order(raw: &str) -> Result<Vec<u32>, RequestValidationError> {
    if raw.trim().is_empty() {
        return Err(RequestValidationError::EmptyOrder);
    }

    raw.split(',')
        .map(str::trim)
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| RequestValidationError::InvalidPageIndex(part.to_string()))
        })
        .collect()
}

pub fn passphrase(headers: &HeaderMap) -> Result<String, RequestValidationError> {
    headers
        .get(PASSPHRASE_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or(RequestValidationError::MissingPassphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn validate_split_accepts_valid_range() {
        let range = validate_split(&SplitParams { start: 1, end: 5 }).unwrap();
        assert_eq!((range.start(), range.end()), (1, 5));
    }

    #[test]
    fn validate_split_rejects_reversed_range() {
        let err = validate_split(&SplitParams { start: 5, end: 1 }).unwrap_err();
        assert!(matches!(err, RequestValidationError::InvalidRange { .. }));
    }

    #[test]
    fn validate_split_rejects_page_zero() {
        assert!(validate_split(&SplitParams { start: 0, end: 1 }).is_err());
    }

    #[test]
    fn parse_page_order_accepts_spaces() {
        assert_eq!(parse_page_order("2, 0,1").unwrap(), vec![2, 0, 1]);
    }

    #[test]
    fn parse_page_order_rejects_garbage() {
        assert!(matches!(
            parse_page_order(""),
            Err(RequestValidationError::EmptyOrder)
        ));
        assert!(matches!(
            parse_page_order("1,,2"),
            Err(RequestValidationError::InvalidPageIndex(_))
        ));
        assert!(matches!(
            parse_page_order("1,-2"),
            Err(RequestValidationError::InvalidPageIndex(_))
        ));
    }

    #[test]
    fn passphrase_requires_header() {
        let mut headers = HeaderMap::new();
        assert!(passphrase(&headers).is_err());

        headers.insert(PASSPHRASE_HEADER, HeaderValue::from_static("s3cret"));
        assert_eq!(passphrase(&headers).unwrap(), "s3cret");
    }
}
