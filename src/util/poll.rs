use std::{
    error::Error,
    future::Future,
    task::{Context, Poll},
    thread,
    time::Duration,
};

use aws_sdk_s3::error::DisplayErrorContext;
use futures::task::noop_waker_ref;

use crate::model::object::ObjectError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn poll_until_ready<Fut, T>(future: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let mut future = Box::pin(future);
    let mut context = Context::from_waker(noop_waker_ref());

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(result) => {
                return result;
            }
            Poll::Pending => {
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

/// Drives a backend request to completion and folds its error, with the full
/// source chain, into an `ObjectError::Backend`.
pub fn poll_backend<Fut, T, E>(future: Fut, operation: &'static str, key: &str) -> Result<T, ObjectError>
where
    Fut: Future<Output = Result<T, E>>,
    E: Error,
{
    poll_until_ready(future).map_err(|err| {
        ObjectError::backend(operation, key, format!("{}", DisplayErrorContext(&err)))
    })
}
