use super::load;
use crate::analyzer::RiskPanel;
use crate::error::{AuditError, Result};
use crate::store::LogStore;

/// Execute the `analyze` command: score the most recent entries.
pub async fn execute(store: &LogStore, limit: usize) -> Result<()> {
    load(store).await?;

    let entries = store.snapshot().await;
    let mut panel = RiskPanel::with_limit(store.provider(), limit);

    let analysis = panel
        .analyze(&entries)
        .await
        .map_err(|notice| AuditError::Provider(notice.message))?;

    println!("Risk score: {}/100 ({:?})", analysis.score, analysis.level);
    if analysis.insights.is_empty() {
        println!("No insights reported.");
    }
    for insight in &analysis.insights {
        println!("  - {}", insight);
    }
    Ok(())
}
