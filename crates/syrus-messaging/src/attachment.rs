use base64::Engine;

use crate::error::{MessagingError, Result};
use crate::types::Attachment;
use syrus_store::BlobStore;

/// A `/`-containing, space-free `data` field names a blob-store key; anything
/// else is treated as inline base64 (spec §4.6: "`data` field is either a
/// blob-store key ... or base64-encoded inline data").
fn is_blob_key(data: &str) -> bool {
    data.contains('/') && !data.contains(' ')
}

pub fn resolve(attachment: &Attachment, blobs: &dyn BlobStore) -> Result<Vec<u8>> {
    if is_blob_key(&attachment.data) {
        blobs
            .get(&attachment.data)
            .map_err(|_| MessagingError::MissingAttachment(attachment.data.clone()))?
            .ok_or_else(|| MessagingError::MissingAttachment(attachment.data.clone()))
    } else {
        base64::engine::general_purpose::STANDARD
            .decode(&attachment.data)
            .map_err(|_| MessagingError::MissingAttachment(attachment.filename.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrus_store::InMemoryBlobStore;

    #[test]
    fn blob_key_is_detected_by_slash_and_no_spaces() {
        assert!(is_blob_key("chan-1/images/intro.png"));
        assert!(!is_blob_key("aGVsbG8="));
        assert!(!is_blob_key("not a key/but has spaces"));
    }

    #[test]
    fn resolve_fetches_from_blob_store_for_keys() {
        let blobs = InMemoryBlobStore::default();
        blobs.put("chan-1/images/intro.png", vec![1, 2, 3]).unwrap();
        let attachment = Attachment { filename: "intro.png".into(), data: "chan-1/images/intro.png".into() };
        assert_eq!(resolve(&attachment, &blobs).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn resolve_decodes_inline_base64() {
        let blobs = InMemoryBlobStore::default();
        let attachment = Attachment { filename: "note.txt".into(), data: "aGVsbG8=".into() };
        assert_eq!(resolve(&attachment, &blobs).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn resolve_errs_when_blob_key_missing() {
        let blobs = InMemoryBlobStore::default();
        let attachment = Attachment { filename: "missing.png".into(), data: "chan-1/images/missing.png".into() };
        assert!(resolve(&attachment, &blobs).is_err());
    }
}
