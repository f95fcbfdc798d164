use std::io::{self, Read};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::model::object::ObjectError;

const COPY_SOURCE_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Accepts either a bare bucket name or an `s3://` URI.
pub fn parse_bucket_from_uri(bucket_uri: &str) -> Result<&str, ObjectError> {
    let bucket = match bucket_uri.split_once("://") {
        Some(("s3", rest)) => rest.trim_end_matches('/'),
        Some((scheme, _)) => {
            return Err(ObjectError::InvalidArgument(format!(
                "unsupported scheme `{}` in: {}",
                scheme, bucket_uri
            )))
        }
        None => bucket_uri,
    };

    if bucket.is_empty() || bucket.contains('/') {
        return Err(ObjectError::InvalidArgument(format!(
            "failed to parse bucket of: {}",
            bucket_uri
        )));
    }

    Ok(bucket)
}

pub fn directory_key(name: &str, separator: &str) -> String {
    format!("{}{}", name, separator)
}

/// Rewrites the leading `old_prefix` of `key` to `new_prefix`. Only the head of
/// the key is touched, so a repeat of the prefix deeper in the key survives.
pub fn replace_prefix(key: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    key.strip_prefix(old_prefix)
        .map(|rest| format!("{}{}", new_prefix, rest))
}

pub fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, utf8_percent_encode(key, COPY_SOURCE_ENCODE))
}

/// Fills a buffer of up to `size` bytes, stopping early only at end of input.
pub fn read_chunk(reader: &mut dyn Read, size: usize) -> io::Result<Vec<u8>> {
    let mut chunk = Vec::new();
    (&mut *reader).take(size as u64).read_to_end(&mut chunk)?;

    Ok(chunk)
}
