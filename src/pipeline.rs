use tracing::{debug, error, info};

use crate::config::Settings;
use crate::error::{AppError, BatchError};
use crate::extract;
use crate::fetch::PageSource;
use crate::normalize::normalize;
use crate::record::AppRecord;

/// Fetch, extract and normalize a single app.
pub async fn process_app<S: PageSource>(
    source: &S,
    app_id: &str,
    settings: &Settings,
) -> Result<AppRecord, AppError> {
    if app_id.is_empty() {
        return Err(AppError::EmptyId);
    }
    let html = source
        .fetch_page(app_id, &settings.locale, &settings.country)
        .await?;
    let raw = extract::parse(&html, app_id);
    Ok(normalize(raw))
}

/// Process app ids one after another. A failing id is logged and left out;
/// the rest keep their input order. Only an entirely empty result is an error.
pub async fn run_batch<S: PageSource>(
    source: &S,
    app_ids: &[String],
    settings: &Settings,
) -> Result<Vec<AppRecord>, BatchError> {
    let mut results = Vec::with_capacity(app_ids.len());

    for app_id in app_ids {
        info!("processing app id: {app_id}");
        match process_app(source, app_id, settings).await {
            Ok(record) => {
                debug!(app_id = %app_id, ?record, "cleaned data");
                results.push(record);
            }
            Err(e) => error!("failed to process app {app_id}: {e}"),
        }
    }

    info!("extracted {}/{} apps", results.len(), app_ids.len());
    if results.is_empty() {
        return Err(BatchError::NoResults {
            requested: app_ids.len(),
        });
    }
    Ok(results)
}
