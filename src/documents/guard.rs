//! Access decisions for a single document, evaluated fresh on every
//! request from the current stored record — no cached authorization.

use crate::auth::password::verify_password;
use crate::storage::models::Document;

use super::DocumentError;

/// Decide whether the supplied credential may read or write `document`.
///
/// An unlocked document requires nothing: possession of the link is the
/// whole trust model. A locked document requires a plaintext credential
/// that verifies against the stored hash; a missing credential and a
/// wrong one are distinct failures.
pub fn authorize(document: &Document, supplied: Option<&str>) -> Result<(), DocumentError> {
    let hash = match &document.password_hash {
        Some(hash) => hash,
        None => return Ok(()),
    };

    let supplied = supplied.ok_or(DocumentError::PasswordRequired)?;
    if !verify_password(hash, supplied) {
        return Err(DocumentError::InvalidPassword);
    }

    Ok(())
}

/// Pick the credential from the three places a client may put it.
/// Precedence: header, then query parameter, then body field.
pub fn resolve_credential<'a>(
    header: Option<&'a str>,
    query: Option<&'a str>,
    body: Option<&'a str>,
) -> Option<&'a str> {
    header.or(query).or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::testutil::make_document;

    #[test]
    fn test_unlocked_allows_anything() {
        let doc = make_document("d1");
        assert!(authorize(&doc, None).is_ok());
        assert!(authorize(&doc, Some("whatever")).is_ok());
    }

    #[test]
    fn test_locked_distinguishes_missing_from_wrong() {
        let mut doc = make_document("d1");
        doc.password_hash = Some(hash_password("abcd").unwrap());

        assert!(matches!(
            authorize(&doc, None),
            Err(DocumentError::PasswordRequired)
        ));
        assert!(matches!(
            authorize(&doc, Some("nope")),
            Err(DocumentError::InvalidPassword)
        ));
        assert!(authorize(&doc, Some("abcd")).is_ok());
    }

    #[test]
    fn test_corrupt_hash_fails_closed() {
        let mut doc = make_document("d1");
        doc.password_hash = Some("garbage".to_string());

        assert!(matches!(
            authorize(&doc, Some("abcd")),
            Err(DocumentError::InvalidPassword)
        ));
    }

    #[test]
    fn test_credential_precedence() {
        assert_eq!(
            resolve_credential(Some("h"), Some("q"), Some("b")),
            Some("h")
        );
        assert_eq!(resolve_credential(None, Some("q"), Some("b")), Some("q"));
        assert_eq!(resolve_credential(None, None, Some("b")), Some("b"));
        assert_eq!(resolve_credential(None, None, None), None);
    }
}
