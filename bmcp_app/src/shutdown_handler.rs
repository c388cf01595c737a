use tokio::sync::watch;

/// Install a Ctrl+C handler and return a receiver that flips to `true` on the signal
pub fn setup() -> Result<watch::Receiver<bool>, ctrlc::Error> {
    let (tx, rx) = watch::channel(false);

    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        let _ = tx.send(true);
    })?;

    Ok(rx)
}

/// Resolve once shutdown is requested; never resolves if the sender is gone
pub async fn requested(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
