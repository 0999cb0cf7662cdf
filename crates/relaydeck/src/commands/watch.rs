//! `watch`: follow pushed proxy updates until interrupted.

use std::collections::HashMap;

use chrono::Local;
use futures_util::StreamExt;
use relaydeck_core::{ProxyId, ProxyRecord, ProxyStore, RealtimeBridge, StoreConfig, StreamingStats};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

/// Records in `next` that are new or differ from their entry in `prev`.
fn changed_records<'a>(prev: &[ProxyRecord], next: &'a [ProxyRecord]) -> Vec<&'a ProxyRecord> {
    let before: HashMap<&ProxyId, &ProxyRecord> = prev.iter().map(|p| (&p.id, p)).collect();
    next.iter()
        .filter(|p| before.get(&p.id).is_none_or(|old| *old != *p))
        .collect()
}

fn record_line(p: &ProxyRecord, color: bool) -> String {
    format!(
        "{}  {:<12} {:<24} {:<12} {:<8} {}",
        Local::now().format("%H:%M:%S"),
        p.id.as_str(),
        p.name,
        output::paint_status(p.status, color),
        output::paint_health(p.health_status, color),
        util::streams(p),
    )
}

fn stats_line(s: &StreamingStats) -> String {
    format!(
        "{}  stats: {} proxies, {} active, {} streams",
        Local::now().format("%H:%M:%S"),
        s.total_proxies,
        s.active_proxies,
        s.total_active_streams,
    )
}

fn render_record(p: &ProxyRecord, global: &GlobalOpts, color: bool) -> Result<String, CliError> {
    match global.output() {
        OutputFormat::Table => Ok(record_line(p, color)),
        // One document per update so the stream stays line-oriented.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_single(
            &OutputFormat::JsonCompact,
            p,
            |_| String::new(),
            |p| p.id.to_string(),
        ),
        OutputFormat::Yaml => Ok(format!(
            "---\n{}",
            output::render_single(&OutputFormat::Yaml, p, |_| String::new(), |_| String::new())?
        )),
        OutputFormat::Plain => Ok(p.id.to_string()),
    }
}

pub async fn handle(
    mut store_config: StoreConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    config::apply_push_url(&mut store_config, args.push_url.as_deref())?;
    let color = output::should_color(&global.color);

    let store = ProxyStore::from_config(&store_config)?;
    store.refresh().await?;

    let bridge = RealtimeBridge::connect(store.clone(), &store_config)?;
    let mut proxies = store.subscribe().into_stream();
    let mut stats = bridge.subscribe_stats();
    // The stream opens with the snapshot current at subscription.
    let Some(mut previous) = proxies.next().await else {
        return Ok(());
    };

    if !global.quiet {
        eprintln!("Watching {} proxies (Ctrl-C to stop)", previous.len());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            snap = proxies.next() => {
                let Some(snap) = snap else { break };
                for record in changed_records(&previous, &snap) {
                    output::print_output(&render_record(record, global, color)?, global.quiet);
                }
                previous = snap;
            }
            res = stats.changed() => {
                if res.is_err() {
                    break;
                }
                let latest = stats.borrow_and_update().clone();
                if let Some(latest) = latest {
                    if matches!(global.output(), OutputFormat::Table) {
                        output::print_output(&stats_line(&latest), global.quiet);
                    }
                }
            }
        }
    }

    bridge.shutdown();
    bridge.join().await;
    store.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaydeck_core::{HealthStatus, ProxyStatus};

    fn record(id: &str, status: ProxyStatus) -> ProxyRecord {
        ProxyRecord {
            id: ProxyId::from(id),
            name: format!("Proxy {id}"),
            description: None,
            server_location: "Lusaka".into(),
            status,
            health_status: HealthStatus::Healthy,
            current_active_streams: 0,
            max_concurrent_streams: 4,
            church_branch_id: None,
        }
    }

    #[test]
    fn only_changed_records_are_reported() {
        let prev = vec![
            record("p1", ProxyStatus::Active),
            record("p2", ProxyStatus::Active),
        ];
        let next = vec![
            record("p1", ProxyStatus::Active),
            record("p2", ProxyStatus::Maintenance),
        ];
        let changed = changed_records(&prev, &next);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, ProxyId::from("p2"));
    }

    #[test]
    fn new_ids_count_as_changed() {
        let prev = vec![record("p1", ProxyStatus::Active)];
        let next = vec![
            record("p1", ProxyStatus::Active),
            record("p9", ProxyStatus::Inactive),
        ];
        assert_eq!(changed_records(&prev, &next).len(), 1);
        assert!(changed_records(&next, &next).is_empty());
    }
}
