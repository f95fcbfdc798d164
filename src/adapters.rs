pub mod adapter;
#[cfg(test)]
pub mod mock;
pub mod multipart;
pub mod s3;
