use crate::{model::object::ObjectError, util};

pub const BUCKET_ENV: &str = "OBJECTDIR_BUCKET";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bucket: String,
    pub separator: String,
}

impl Config {
    /// Takes the bucket from the command line, falling back to `OBJECTDIR_BUCKET`.
    pub fn from_env(bucket: Option<String>, separator: String) -> Result<Self, ObjectError> {
        Self::resolve(bucket, std::env::var(BUCKET_ENV).ok(), separator)
    }

    pub fn resolve(
        cli_bucket: Option<String>,
        env_bucket: Option<String>,
        separator: String,
    ) -> Result<Self, ObjectError> {
        let bucket_uri = cli_bucket
            .or(env_bucket)
            .filter(|bucket| !bucket.is_empty())
            .ok_or_else(|| {
                ObjectError::Config(format!("bucket, pass --bucket or set {}", BUCKET_ENV))
            })?;

        if separator.is_empty() {
            return Err(ObjectError::InvalidArgument(
                "separator must not be empty".to_string(),
            ));
        }

        Ok(Self {
            bucket: util::object::parse_bucket_from_uri(&bucket_uri)?.to_string(),
            separator,
        })
    }
}
