//! Background expiry sweep.
//!
//! The lazy check in [`super::fetch_live`] only covers documents somebody
//! touches; this sweep deletes expired documents nobody asks for, so they
//! never linger. Both are required — neither is sufficient alone.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::AppState;

/// Start the background expiry sweeper task
pub fn start_expiry_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    let interval = Duration::from_secs(state.config.documents.sweep_interval_seconds);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);

        loop {
            interval_timer.tick().await;
            run_sweep(&state).await;
        }
    })
}

async fn run_sweep(state: &AppState) {
    debug!("Running expiry sweep");

    let db = state.db.clone();
    let result =
        tokio::task::spawn_blocking(move || db.delete_expired_documents(chrono::Utc::now())).await;

    match result {
        Ok(Ok(count)) if count > 0 => {
            tracing::info!(documents_deleted = count, "Expired documents swept")
        }
        Ok(Ok(_)) => {}
        // Transient storage failures are retried on the next tick
        Ok(Err(e)) => error!(error = %e, "Expiry sweep failed"),
        Err(e) => error!(error = %e, "Expiry sweep task panicked"),
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::setup_db;
    use chrono::{Duration, Utc};

    #[test]
    fn test_sweep_deletes_only_expired() {
        let (db, _temp) = setup_db();
        let now = Utc::now();

        let mut expired = crate::testutil::make_document("expired");
        expired.expires_at = Some(now - Duration::minutes(5));
        db.put_document(&expired).unwrap();

        let mut future = crate::testutil::make_document("future");
        future.expires_at = Some(now + Duration::minutes(5));
        db.put_document(&future).unwrap();

        db.put_document(&crate::testutil::make_document("forever"))
            .unwrap();

        assert_eq!(db.delete_expired_documents(now).unwrap(), 1);
        assert!(db.get_document("expired").unwrap().is_none());
        assert!(db.get_document("future").unwrap().is_some());
        assert!(db.get_document("forever").unwrap().is_some());

        // A second sweep finds nothing
        assert_eq!(db.delete_expired_documents(now).unwrap(), 0);
    }

    #[test]
    fn test_sweep_treats_boundary_as_expired() {
        let (db, _temp) = setup_db();
        let now = Utc::now();

        let mut doc = crate::testutil::make_document("boundary");
        doc.expires_at = Some(now);
        db.put_document(&doc).unwrap();

        assert_eq!(db.delete_expired_documents(now).unwrap(), 1);
    }
}
