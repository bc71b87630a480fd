use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels the token on Ctrl-C. Returns early when something else cancels it first, such as the
/// device going away.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, stopping the tracker");
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {},
    };
}
