//! Run an async call to completion on the calling thread.
//!
//! # Design
//! Each call gets its own current-thread runtime. When the caller is already
//! inside a tokio runtime, the future is driven on a scoped helper thread
//! instead, because a runtime cannot be entered from one of its own worker
//! threads and the caller's scheduler must not be reused. Either way the
//! calling thread blocks until the future resolves, its `Result` comes back
//! untouched, and a panic inside the future is resumed on the caller.

use std::future::Future;
use std::panic;

use tokio::runtime::{Builder, Handle};

use crate::error::{ApiError, Result};

pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send,
    T: Send,
{
    if Handle::try_current().is_err() {
        return run(future);
    }

    std::thread::scope(|scope| {
        match scope.spawn(|| run(future)).join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

fn run<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ApiError::Runtime)?;
    runtime.block_on(future)
}
