use super::{load, FilterArgs};
use crate::error::Result;
use crate::export::{ExportOutcome, Exporter};
use crate::filter::filter;
use crate::store::LogStore;
use chrono::Utc;
use std::path::Path;

/// Execute the `export` command: write the filtered log in the chosen format.
pub async fn execute(
    store: &LogStore,
    exporter: &Exporter,
    args: &FilterArgs,
    format: &str,
    out: &Path,
) -> Result<()> {
    let (search, filters) = args.parse_filters()?;
    load(store).await?;

    let now = Utc::now();
    let entries = store.snapshot().await;
    let visible = filter(&entries, &search, &filters, now);

    match exporter.export_named(format, &visible, now)? {
        ExportOutcome::Ready(artifact) => {
            let path = artifact.write_to(out)?;
            println!("Exported {} entries to {}", visible.len(), path.display());
        }
        ExportOutcome::Unsupported(notice) => {
            println!("{}", notice);
        }
    }
    Ok(())
}
