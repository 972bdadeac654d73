use anyhow::Result;

/// Everything in the tracker happens on one logical thread: input, ticks and storage writes.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
