use std::io::Read;

use crate::model::object::{ListingPage, ObjectError};

/// Blocking view of the object-storage calls the directory layer needs. Each
/// method issues its request and waits for the response.
pub trait ObjectAdapter {
    fn store_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(), ObjectError>;

    fn store_copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<(), ObjectError>;

    fn store_delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError>;

    fn store_list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListingPage, ObjectError>;

    /// Returns the number of bytes uploaded.
    fn store_upload_stream(
        &self,
        bucket: &str,
        key: &str,
        body: &mut dyn Read,
    ) -> Result<u64, ObjectError>;
}
