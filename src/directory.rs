use std::io::Read;

use tracing::{error, info, span, Level};

use crate::{
    adapters, lister,
    model::object::{BatchOutcome, ObjectError},
    util,
};

pub const DEFAULT_SEPARATOR: &str = "/";

/// Emulates directories on top of a flat bucket. A directory is a key prefix
/// ending in the separator, optionally backed by a zero-byte placeholder.
///
/// Multi-object operations are sequences of independent calls: nothing is
/// undone when a later step fails.
pub struct DirectoryManager {
    pub client: Box<dyn adapters::adapter::ObjectAdapter>,
    pub bucket: String,
}

impl DirectoryManager {
    pub fn new(client: Box<dyn adapters::adapter::ObjectAdapter>, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }

    pub fn list_keys(&self, prefix: &str, suffix: &str) -> lister::KeyLister<'_> {
        lister::KeyLister::new(self.client.as_ref(), &self.bucket, prefix, suffix)
    }

    /// Writes the placeholder `name + separator` and returns its key.
    pub fn create_directory(&self, name: &str, separator: &str) -> Result<String, ObjectError> {
        let span = span!(Level::INFO, "create_directory", context = "create_directory");
        let _e = span.enter();

        let key = util::object::directory_key(name, separator);
        info!(bucket = self.bucket.as_str(), key = key.as_str(), "creating directory");

        if let Err(err) = self.client.store_put_object(&self.bucket, &key, None) {
            error!(error_message=%err, error_group="put_object");
            return Err(err);
        }

        Ok(key)
    }

    /// Moves the single object `old + separator` to `new + separator`. Nested
    /// objects stay where they are.
    pub fn rename_directory_object(
        &self,
        old_name: &str,
        new_name: &str,
        separator: &str,
    ) -> Result<(), ObjectError> {
        let span = span!(Level::INFO, "rename_directory_object", context = "rename_directory_object");
        let _e = span.enter();

        let old_key = util::object::directory_key(old_name, separator);
        let new_key = util::object::directory_key(new_name, separator);

        self.move_object(&old_key, &new_key)
    }

    /// Moves every object under `old + separator` to the same relative key
    /// under `new + separator`, one copy and delete per key.
    ///
    /// A key whose copy fails is left untouched. A key whose delete fails is
    /// present at both source and destination. Both are reported in the
    /// outcome rather than rolled back, as is a listing that breaks off after
    /// some keys were moved. `Err` means no key was touched.
    pub fn rename_directory(
        &self,
        old_name: &str,
        new_name: &str,
        separator: &str,
    ) -> Result<BatchOutcome, ObjectError> {
        let span = span!(Level::INFO, "rename_directory", context = "rename_directory");
        let _e = span.enter();

        let old_prefix = util::object::directory_key(old_name, separator);
        let new_prefix = util::object::directory_key(new_name, separator);
        info!(
            old_prefix = old_prefix.as_str(),
            new_prefix = new_prefix.as_str(),
            "renaming directory"
        );

        // copies would land back under the prefix being listed
        if new_prefix.starts_with(&old_prefix) {
            let err = ObjectError::InvalidArgument(format!(
                "cannot rename {} into itself as {}",
                old_prefix, new_prefix
            ));
            error!(error_message=%err, error_group="rename_directory");
            return Err(err);
        }

        if let Err(err) = self.client.store_put_object(&self.bucket, &new_prefix, None) {
            error!(error_message=%err, error_group="put_object");
            return Err(err);
        }

        let mut outcome = BatchOutcome::default();
        for key in self.list_keys(&old_prefix, "") {
            let key = match key {
                Err(err) => {
                    outcome.listing_error = Some(err);
                    break;
                }
                Ok(key) => key,
            };
            let Some(dest_key) = util::object::replace_prefix(&key, &old_prefix, &new_prefix)
            else {
                continue;
            };

            let result = self.move_object(&key, &dest_key);
            outcome.record(key, result);
        }

        info!(
            moved = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            listing_failed = outcome.listing_error.is_some(),
            "renamed directory"
        );

        Ok(outcome)
    }

    /// Deletes every object under `name + separator`. An empty prefix is a
    /// successful no-op. A listing failure ends the walk and is reported in
    /// the outcome next to the keys already deleted.
    pub fn delete_directory(&self, name: &str, separator: &str) -> Result<BatchOutcome, ObjectError> {
        let span = span!(Level::INFO, "delete_directory", context = "delete_directory");
        let _e = span.enter();

        let prefix = util::object::directory_key(name, separator);
        info!(prefix = prefix.as_str(), "deleting directory");

        let mut outcome = BatchOutcome::default();
        for key in self.list_keys(&prefix, "") {
            let key = match key {
                Err(err) => {
                    outcome.listing_error = Some(err);
                    break;
                }
                Ok(key) => key,
            };
            let result = self.delete_object(&key);
            outcome.record(key, result);
        }

        info!(
            deleted = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            listing_failed = outcome.listing_error.is_some(),
            "deleted directory"
        );

        Ok(outcome)
    }

    /// Deletes only the placeholder `name + separator`.
    pub fn delete_directory_object(&self, name: &str, separator: &str) -> Result<(), ObjectError> {
        let span = span!(Level::INFO, "delete_directory_object", context = "delete_directory_object");
        let _e = span.enter();

        let key = util::object::directory_key(name, separator);

        self.delete_object(&key)
    }

    /// Uploads `content` to `key` and returns the number of bytes written.
    pub fn save_file(&self, key: &str, content: &mut dyn Read) -> Result<u64, ObjectError> {
        let span = span!(Level::INFO, "save_file", context = "save_file");
        let _e = span.enter();
        info!(key = key, "saving file");

        match self.client.store_upload_stream(&self.bucket, key, content) {
            Err(err) => {
                error!(error_message=%err, error_group="upload_stream");
                Err(err)
            }
            Ok(size) => {
                info!(key = key, size = size, "saved file");
                Ok(size)
            }
        }
    }

    fn move_object(&self, source_key: &str, dest_key: &str) -> Result<(), ObjectError> {
        info!(source_key = source_key, dest_key = dest_key, "copying object");
        if let Err(err) = self
            .client
            .store_copy_object(&self.bucket, source_key, dest_key)
        {
            error!(error_message=%err, error_group="copy_object");
            return Err(err);
        }

        self.delete_object(source_key)
    }

    fn delete_object(&self, key: &str) -> Result<(), ObjectError> {
        info!(key = key, "deleting object");
        if let Err(err) = self.client.store_delete_object(&self.bucket, key) {
            error!(error_message=%err, error_group="delete_object");
            return Err(err);
        }

        Ok(())
    }
}
