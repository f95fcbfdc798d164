use std::io::Read;

use tracing::{error, info};

use crate::{model::object::ObjectError, util};

/// Bodies below this size go up in a single request; larger ones are split
/// into parts of this size.
pub const MULTIPART_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Part number and entity tag of an uploaded part.
pub type CompletedParts = Vec<(i32, Option<String>)>;

/// The requests a chunked upload is made of, bound to one bucket.
pub trait PartUploader {
    fn put_whole(&self, key: &str, body: Vec<u8>) -> Result<(), ObjectError>;

    fn create_upload(&self, key: &str) -> Result<String, ObjectError>;

    /// Returns the part's entity tag.
    fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> Result<Option<String>, ObjectError>;

    fn complete_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: CompletedParts,
    ) -> Result<(), ObjectError>;

    fn abort_upload(&self, key: &str, upload_id: &str) -> Result<(), ObjectError>;
}

/// Sends `body` whole when it is shorter than `chunk_size`, otherwise as a
/// multipart upload of `chunk_size` parts. A multipart upload that fails after
/// it was created is aborted before the error is returned.
pub fn upload_stream(
    uploader: &dyn PartUploader,
    key: &str,
    body: &mut dyn Read,
    chunk_size: usize,
) -> Result<u64, ObjectError> {
    let first = read_part(body, key, chunk_size)?;

    if first.len() < chunk_size {
        let size = first.len() as u64;
        uploader.put_whole(key, first)?;
        return Ok(size);
    }

    let upload_id = uploader.create_upload(key)?;
    info!(key = key, upload_id = %upload_id, "multipart upload started");

    match upload_parts(uploader, key, &upload_id, first, body, chunk_size) {
        Ok(size) => Ok(size),
        Err(err) => {
            if let Err(abort_err) = uploader.abort_upload(key, &upload_id) {
                error!(error_message=%abort_err, error_group="abort_multipart_upload");
            }

            Err(err)
        }
    }
}

fn upload_parts(
    uploader: &dyn PartUploader,
    key: &str,
    upload_id: &str,
    first: Vec<u8>,
    body: &mut dyn Read,
    chunk_size: usize,
) -> Result<u64, ObjectError> {
    let mut parts = Vec::new();
    let mut part_number: i32 = 1;
    let mut size: u64 = 0;
    let mut chunk = first;

    while !chunk.is_empty() {
        size += chunk.len() as u64;

        let e_tag = uploader.upload_part(key, upload_id, part_number, chunk)?;
        parts.push((part_number, e_tag));
        part_number += 1;

        chunk = read_part(body, key, chunk_size)?;
    }

    uploader.complete_upload(key, upload_id, parts)?;

    Ok(size)
}

fn read_part(body: &mut dyn Read, key: &str, chunk_size: usize) -> Result<Vec<u8>, ObjectError> {
    util::object::read_chunk(body, chunk_size).map_err(|source| ObjectError::Io {
        key: key.to_string(),
        source,
    })
}
