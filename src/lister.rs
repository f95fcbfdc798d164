use std::{collections::VecDeque, iter::FusedIterator};

use tracing::{debug, error};

use crate::{adapters, model::object::ObjectError};

/// Lazy, single-pass walk over the keys of a bucket that start with `prefix`
/// and end with `suffix`. A page is fetched only once the previous one has
/// been drained, so dropping the lister stops further requests.
///
/// The backend only filters by prefix; the suffix is checked here against
/// every returned key. The first error ends the iteration.
pub struct KeyLister<'a> {
    client: &'a dyn adapters::adapter::ObjectAdapter,
    bucket: String,
    prefix: String,
    suffix: String,
    buffer: VecDeque<String>,
    continuation_token: Option<String>,
    pages_fetched: u32,
    exhausted: bool,
}

impl<'a> KeyLister<'a> {
    pub fn new(
        client: &'a dyn adapters::adapter::ObjectAdapter,
        bucket: &str,
        prefix: &str,
        suffix: &str,
    ) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            buffer: VecDeque::new(),
            continuation_token: None,
            pages_fetched: 0,
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> Result<(), ObjectError> {
        let page = self.client.store_list_objects_page(
            &self.bucket,
            &self.prefix,
            self.continuation_token.take(),
        )?;

        let first_page = self.pages_fetched == 0;
        self.pages_fetched += 1;
        debug!(
            prefix = self.prefix.as_str(),
            page = self.pages_fetched,
            count = page.keys.len(),
            "listed page"
        );

        if first_page && page.keys.is_empty() {
            self.exhausted = true;
            return Ok(());
        }

        self.continuation_token = page.next_token;
        if self.continuation_token.is_none() {
            self.exhausted = true;
        }

        let (prefix, suffix) = (&self.prefix, &self.suffix);
        self.buffer.extend(
            page.keys
                .into_iter()
                .filter(|key| key.starts_with(prefix.as_str()) && key.ends_with(suffix.as_str())),
        );

        Ok(())
    }
}

impl Iterator for KeyLister<'_> {
    type Item = Result<String, ObjectError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.buffer.pop_front() {
                return Some(Ok(key));
            }

            if self.exhausted {
                return None;
            }

            if let Err(err) = self.fetch_page() {
                error!(error_message=%err, error_group="list_objects");
                self.exhausted = true;
                return Some(Err(err));
            }
        }
    }
}

impl FusedIterator for KeyLister<'_> {}
