//! Bearer credential extraction for both transports.
//!
//! The HTTP header and the gRPC metadata value go through the same parser so
//! the gate only ever sees one [`Credential`] shape.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tonic::metadata::MetadataMap;

use super::AuthError;

/// Header (and metadata key) carrying the credential.
pub const AUTHORIZATION_KEY: &str = "authorization";

/// The only accepted scheme, compared lower-cased.
pub const BEARER_SCHEME: &str = "bearer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub scheme: String,
    pub token: String,
}

/// Parse a raw `<scheme> <token>` value.
///
/// # Errors
///
/// - [`AuthError::MissingCredential`] for an empty value.
/// - [`AuthError::MalformedCredential`] unless the value splits on its first
///   space into a non-empty scheme and a non-empty, whitespace-free token.
/// - [`AuthError::UnsupportedScheme`] for any scheme other than `bearer`.
pub fn parse(raw: &str) -> Result<Credential, AuthError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AuthError::MissingCredential);
    }

    let (scheme, token) = raw.split_once(' ').ok_or(AuthError::MalformedCredential)?;
    if scheme.is_empty() || token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedCredential);
    }

    let scheme = scheme.to_lowercase();
    if scheme != BEARER_SCHEME {
        return Err(AuthError::UnsupportedScheme(scheme));
    }

    Ok(Credential {
        scheme,
        token: token.to_string(),
    })
}

/// Extract the credential from HTTP request headers.
///
/// # Errors
///
/// See [`parse`]; a missing header is [`AuthError::MissingCredential`] and a
/// header with non-visible-ASCII bytes is [`AuthError::MalformedCredential`].
pub fn from_headers(headers: &HeaderMap) -> Result<Credential, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    parse(value)
}

/// Extract the credential from gRPC call metadata, using the first value.
///
/// # Errors
///
/// See [`from_headers`].
pub fn from_metadata(metadata: &MetadataMap) -> Result<Credential, AuthError> {
    let value = metadata
        .get_all(AUTHORIZATION_KEY)
        .iter()
        .next()
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    parse(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::http::HeaderValue;
    use tonic::metadata::MetadataValue;

    #[test]
    fn parses_bearer_credential() -> Result<()> {
        let credential = parse("Bearer abc.def")?;
        assert_eq!(credential.scheme, "bearer");
        assert_eq!(credential.token, "abc.def");
        Ok(())
    }

    #[test]
    fn scheme_is_case_insensitive() -> Result<()> {
        assert_eq!(parse("BEARER abc")?.scheme, "bearer");
        assert_eq!(parse("bEaReR abc")?.token, "abc");
        Ok(())
    }

    #[test]
    fn empty_value_is_missing() {
        assert_eq!(parse(""), Err(AuthError::MissingCredential));
        assert_eq!(parse("   "), Err(AuthError::MissingCredential));
    }

    #[test]
    fn value_without_space_is_malformed() {
        assert_eq!(parse("abc.def"), Err(AuthError::MalformedCredential));
        assert_eq!(parse("Bearer"), Err(AuthError::MalformedCredential));
    }

    #[test]
    fn extra_tokens_are_malformed() {
        assert_eq!(parse("Bearer abc def"), Err(AuthError::MalformedCredential));
        assert_eq!(parse("Bearer  abc"), Err(AuthError::MalformedCredential));
    }

    #[test]
    fn other_schemes_are_unsupported() {
        assert_eq!(
            parse("Basic abc.def"),
            Err(AuthError::UnsupportedScheme("basic".to_string()))
        );
    }

    #[test]
    fn header_and_metadata_produce_the_same_credential() -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer v4.local.xyz"));

        let mut metadata = MetadataMap::new();
        metadata.insert(AUTHORIZATION_KEY, MetadataValue::from_static("Bearer v4.local.xyz"));

        assert_eq!(from_headers(&headers)?, from_metadata(&metadata)?);
        Ok(())
    }

    #[test]
    fn missing_header_is_missing() {
        assert_eq!(
            from_headers(&HeaderMap::new()),
            Err(AuthError::MissingCredential)
        );
        assert_eq!(
            from_metadata(&MetadataMap::new()),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn empty_header_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(""));
        assert_eq!(from_headers(&headers), Err(AuthError::MissingCredential));
    }

    #[test]
    fn non_ascii_header_is_malformed() -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xe2\x82\xac")?);
        assert_eq!(from_headers(&headers), Err(AuthError::MalformedCredential));
        Ok(())
    }

    #[test]
    fn metadata_uses_first_value() -> Result<()> {
        let mut metadata = MetadataMap::new();
        metadata.append(AUTHORIZATION_KEY, MetadataValue::from_static("Bearer first"));
        metadata.append(AUTHORIZATION_KEY, MetadataValue::from_static("Bearer second"));
        assert_eq!(from_metadata(&metadata)?.token, "first");
        Ok(())
    }
}
