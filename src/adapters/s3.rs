use std::io::Read;

use aws_sdk_s3::{
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
};

use crate::{
    adapters::{adapter::ObjectAdapter, multipart},
    model::object::{ListingPage, ObjectError},
    util,
};

impl ObjectAdapter for aws_sdk_s3::Client {
    fn store_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(), ObjectError> {
        let req = self
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.unwrap_or_default()));

        util::poll::poll_backend(req.send(), "put_object", key)?;

        Ok(())
    }

    fn store_copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<(), ObjectError> {
        let req = self
            .copy_object()
            .bucket(bucket)
            .copy_source(util::object::copy_source(bucket, source_key))
            .key(dest_key);

        util::poll::poll_backend(req.send(), "copy_object", source_key)?;

        Ok(())
    }

    fn store_delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        let req = self.delete_object().bucket(bucket).key(key);

        util::poll::poll_backend(req.send(), "delete_object", key)?;

        Ok(())
    }

    fn store_list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListingPage, ObjectError> {
        let req = self
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation_token);

        let lo = util::poll::poll_backend(req.send(), "list_objects", prefix)?;

        let keys = lo
            .contents()
            .iter()
            .filter_map(|o| o.key())
            .map(|key| key.to_string())
            .collect();

        Ok(ListingPage {
            keys,
            next_token: lo.next_continuation_token().map(|tok| tok.to_string()),
        })
    }

    fn store_upload_stream(
        &self,
        bucket: &str,
        key: &str,
        body: &mut dyn Read,
    ) -> Result<u64, ObjectError> {
        let uploader = S3Uploader {
            client: self,
            bucket,
        };

        multipart::upload_stream(&uploader, key, body, multipart::MULTIPART_CHUNK_SIZE)
    }
}

struct S3Uploader<'a> {
    client: &'a aws_sdk_s3::Client,
    bucket: &'a str,
}

impl multipart::PartUploader for S3Uploader<'_> {
    fn put_whole(&self, key: &str, body: Vec<u8>) -> Result<(), ObjectError> {
        self.client.store_put_object(self.bucket, key, Some(body))
    }

    fn create_upload(&self, key: &str) -> Result<String, ObjectError> {
        let req = self
            .client
            .create_multipart_upload()
            .bucket(self.bucket)
            .key(key);
        let upload = util::poll::poll_backend(req.send(), "create_multipart_upload", key)?;

        upload
            .upload_id()
            .map(|id| id.to_string())
            .ok_or_else(|| ObjectError::backend("create_multipart_upload", key, "missing upload id"))
    }

    fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        body: Vec<u8>,
    ) -> Result<Option<String>, ObjectError> {
        let req = self
            .client
            .upload_part()
            .bucket(self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body));
        let part = util::poll::poll_backend(req.send(), "upload_part", key)?;

        Ok(part.e_tag().map(|tag| tag.to_string()))
    }

    fn complete_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: multipart::CompletedParts,
    ) -> Result<(), ObjectError> {
        let parts: Vec<CompletedPart> = parts
            .into_iter()
            .map(|(part_number, e_tag)| {
                CompletedPart::builder()
                    .set_e_tag(e_tag)
                    .part_number(part_number)
                    .build()
            })
            .collect();

        let req = self
            .client
            .complete_multipart_upload()
            .bucket(self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            );
        util::poll::poll_backend(req.send(), "complete_multipart_upload", key)?;

        Ok(())
    }

    fn abort_upload(&self, key: &str, upload_id: &str) -> Result<(), ObjectError> {
        let req = self
            .client
            .abort_multipart_upload()
            .bucket(self.bucket)
            .key(key)
            .upload_id(upload_id);
        util::poll::poll_backend(req.send(), "abort_multipart_upload", key)?;

        Ok(())
    }
}
