use super::{load, FilterArgs};
use crate::error::Result;
use crate::filter::filter;
use crate::rate::ops_in_window;
use crate::store::LogStore;
use crate::types::AuditLogEntry;
use chrono::{DateTime, Utc};

/// Execute the `list` command: print the filtered log and live metrics.
pub async fn execute(
    store: &LogStore,
    args: &FilterArgs,
    limit: Option<usize>,
    window: chrono::Duration,
) -> Result<()> {
    let (search, filters) = args.parse_filters()?;
    load(store).await?;

    let now = Utc::now();
    let entries = store.snapshot().await;
    let visible = filter(&entries, &search, &filters, now);

    if visible.is_empty() {
        println!("No audit logs match the current filters.");
    } else {
        print!("{}", render_table(&visible, limit));
    }

    let summary = store.summary().await;
    println!(
        "\n{} of {} entries | {} ops/min | {} actions, {} warnings, {} security events, {} active users",
        visible.len(),
        entries.len(),
        ops_in_window(&entries, now, window),
        summary.total_actions,
        summary.warning_logs,
        summary.security_events,
        summary.active_users,
    );
    Ok(())
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn render_table(entries: &[AuditLogEntry], limit: Option<usize>) -> String {
    let mut out = format!(
        "{:<20} {:<9} {:<9} {:<20} {:<10} ACTION\n",
        "TIMESTAMP", "SEVERITY", "TYPE", "USER", "STATUS"
    );
    for entry in entries.iter().take(limit.unwrap_or(usize::MAX)) {
        out.push_str(&format!(
            "{:<20} {:<9} {:<9} {:<20} {:<10} {}\n",
            format_timestamp(entry.timestamp),
            entry.severity.to_string(),
            entry.action_type.to_string(),
            entry.user,
            entry.status,
            entry.action,
        ));
    }
    out
}
