use std::{
    collections::{BTreeMap, HashSet},
    io::Read,
    sync::{Arc, Mutex},
};

use crate::{
    adapters::adapter::ObjectAdapter,
    model::object::{ListingPage, ObjectError},
};

pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory bucket. Listing pages are key-ordered and the continuation token
/// is the last key of the previous page.
pub struct MockClient {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub page_size: usize,
    pub failures: Mutex<HashSet<(&'static str, String)>>,
    pub list_calls: Mutex<u32>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size,
            failures: Mutex::new(HashSet::new()),
            list_calls: Mutex::new(0),
        }
    }

    pub fn with_keys(keys: &[&str]) -> Self {
        let client = Self::new();
        client.insert_keys(keys);

        client
    }

    pub fn insert_keys(&self, keys: &[&str]) {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.insert(key.to_string(), Vec::new());
        }
    }

    /// Makes every later `operation` call on `key` fail. For a listing past
    /// the first page, use `"list_objects_after"` with the continuation token.
    pub fn fail_on(&self, operation: &'static str, key: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((operation, key.to_string()));
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn list_calls(&self) -> u32 {
        *self.list_calls.lock().unwrap()
    }

    fn check(&self, operation: &'static str, key: &str) -> Result<(), ObjectError> {
        if self
            .failures
            .lock()
            .unwrap()
            .contains(&(operation, key.to_string()))
        {
            return Err(ObjectError::backend(operation, key, "injected failure"));
        }

        Ok(())
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectAdapter for MockClient {
    fn store_put_object(
        &self,
        _bucket: &str,
        key: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(), ObjectError> {
        self.check("put_object", key)?;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), body.unwrap_or_default());

        Ok(())
    }

    fn store_copy_object(
        &self,
        _bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<(), ObjectError> {
        self.check("copy_object", source_key)?;
        let mut objects = self.objects.lock().unwrap();
        let body = objects.get(source_key).cloned().ok_or_else(|| {
            ObjectError::backend("copy_object", source_key, "NoSuchKey")
        })?;
        objects.insert(dest_key.to_string(), body);

        Ok(())
    }

    fn store_delete_object(&self, _bucket: &str, key: &str) -> Result<(), ObjectError> {
        self.check("delete_object", key)?;
        self.objects.lock().unwrap().remove(key);

        Ok(())
    }

    fn store_list_objects_page(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListingPage, ObjectError> {
        *self.list_calls.lock().unwrap() += 1;
        self.check("list_objects", prefix)?;
        if let Some(token) = &continuation_token {
            self.check("list_objects_after", token)?;
        }

        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| match &continuation_token {
                Some(token) => key.as_str() > token.as_str(),
                None => true,
            });

        let keys: Vec<String> = matching.by_ref().take(self.page_size).cloned().collect();
        let next_token = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ListingPage { keys, next_token })
    }

    fn store_upload_stream(
        &self,
        bucket: &str,
        key: &str,
        body: &mut dyn Read,
    ) -> Result<u64, ObjectError> {
        let mut buf = Vec::new();
        body.read_to_end(&mut buf).map_err(|source| ObjectError::Io {
            key: key.to_string(),
            source,
        })?;
        let size = buf.len() as u64;
        self.store_put_object(bucket, key, Some(buf))?;

        Ok(size)
    }
}

/// Lets a test keep inspecting the bucket after handing the client over.
impl ObjectAdapter for Arc<MockClient> {
    fn store_put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(), ObjectError> {
        self.as_ref().store_put_object(bucket, key, body)
    }

    fn store_copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<(), ObjectError> {
        self.as_ref().store_copy_object(bucket, source_key, dest_key)
    }

    fn store_delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectError> {
        self.as_ref().store_delete_object(bucket, key)
    }

    fn store_list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ListingPage, ObjectError> {
        self.as_ref()
            .store_list_objects_page(bucket, prefix, continuation_token)
    }

    fn store_upload_stream(
        &self,
        bucket: &str,
        key: &str,
        body: &mut dyn Read,
    ) -> Result<u64, ObjectError> {
        self.as_ref().store_upload_stream(bucket, key, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_objects_page_tokens() {
        let client = MockClient::with_page_size(2);
        client.insert_keys(&["a/1", "a/2", "a/3", "b/1"]);

        let first = client.store_list_objects_page("bucket", "a/", None).unwrap();
        assert_eq!(first.keys, vec!["a/1", "a/2"]);
        assert_eq!(first.next_token, Some("a/2".to_string()));

        let second = client
            .store_list_objects_page("bucket", "a/", first.next_token)
            .unwrap();
        assert_eq!(second.keys, vec!["a/3"]);
        assert_eq!(second.next_token, None);
    }

    #[test]
    fn test_exact_page_has_no_token() {
        let client = MockClient::with_page_size(2);
        client.insert_keys(&["a/1", "a/2"]);

        let page = client.store_list_objects_page("bucket", "a/", None).unwrap();
        assert_eq!(page.keys.len(), 2);
        assert_eq!(page.next_token, None);
    }
}
