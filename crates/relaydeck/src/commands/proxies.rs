//! Proxy command handlers.

use tabled::Tabled;

use relaydeck_core::{
    CreateProxyRequest, HealthCheckResult, ProxyFilter, ProxyId, ProxyRecord, ProxyStatus,
    ProxyStore, ProxySummary, UpdateProxyRequest, Validate,
};

use crate::cli::{GlobalOpts, ProxiesArgs, ProxiesCommand, ProxyListArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProxyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Streams")]
    streams: String,
    #[tabled(rename = "Branch")]
    branch: String,
}

impl From<&ProxyRecord> for ProxyRow {
    fn from(p: &ProxyRecord) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            location: p.server_location.clone(),
            status: p.status.to_string(),
            health: p.health_status.to_string(),
            streams: util::streams(p),
            branch: p.church_branch_id.clone().unwrap_or_default(),
        }
    }
}

fn detail(p: &ProxyRecord, color: bool) -> String {
    [
        format!("ID:          {}", p.id),
        format!("Name:        {}", p.name),
        format!("Description: {}", p.description.as_deref().unwrap_or("-")),
        format!("Location:    {}", p.server_location),
        format!("Status:      {}", output::paint_status(p.status, color)),
        format!("Health:      {}", output::paint_health(p.health_status, color)),
        format!("Streams:     {}", util::streams(p)),
        format!("Available:   {}", if p.is_available() { "yes" } else { "no" }),
        format!("Branch:      {}", p.church_branch_id.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

fn health_detail(r: &HealthCheckResult, color: bool) -> String {
    [
        format!("Proxy:    {}", r.proxy_id),
        format!("Health:   {}", output::paint_health(r.status, color)),
        format!(
            "Latency:  {}",
            r.response_time_ms
                .map_or_else(|| "-".into(), |ms| format!("{ms}ms"))
        ),
        format!("Checked:  {}", r.checked_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Message:  {}", r.message.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

fn summary_detail(s: &ProxySummary) -> String {
    [
        format!("Proxies:     {}", s.total),
        format!(
            "Status:      {} active, {} inactive, {} maintenance",
            s.active, s.inactive, s.maintenance
        ),
        format!(
            "Health:      {} healthy, {} warning, {} error",
            s.healthy, s.warnings, s.errors
        ),
        format!("Available:   {}", s.available),
        format!("Streams:     {}/{}", s.active_streams, s.stream_capacity),
    ]
    .join("\n")
}

fn list_filter(args: &ProxyListArgs) -> ProxyFilter {
    ProxyFilter {
        status: args.status.map(Into::into),
        health_status: args.health.map(Into::into),
        church_branch_id: args.branch.clone(),
        search: args.search.clone(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    store: &ProxyStore,
    args: ProxiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        ProxiesCommand::List(list) => {
            let filter = list_filter(&list);
            let mut proxies = if list.server_side {
                store.fetch_proxies(&filter).await?;
                store.proxies()
            } else {
                store.refresh().await?;
                store.filter_proxies(&filter)
            };
            if list.available {
                proxies.retain(ProxyRecord::is_available);
            }
            let out = output::render_list(
                &global.output(),
                &proxies,
                |p| ProxyRow::from(p),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Get { id } => {
            store.refresh().await?;
            let proxy = util::find_proxy(store, &id)?;
            let out = output::render_single(
                &global.output(),
                &proxy,
                |p| detail(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Create {
            name,
            location,
            max_streams,
            description,
            branch,
            status,
        } => {
            let req = CreateProxyRequest {
                name,
                description,
                server_location: location,
                max_concurrent_streams: max_streams,
                church_branch_id: branch,
                status: status.map(Into::into),
            };
            req.validate()?;
            let created = store.create_proxy(&req).await?;
            let out = output::render_single(
                &global.output(),
                &created,
                |p| detail(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Update {
            id,
            name,
            description,
            location,
            status,
            health,
            max_streams,
            branch,
        } => {
            let req = UpdateProxyRequest {
                name,
                description,
                server_location: location,
                status: status.map(Into::into),
                health_status: health.map(Into::into),
                max_concurrent_streams: max_streams,
                church_branch_id: branch,
            };
            req.validate()?;
            let updated = store.update_proxy(&ProxyId::from(id), &req).await?;
            let out = output::render_single(
                &global.output(),
                &updated,
                |p| detail(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete proxy {id}?"), global.yes)? {
                return Ok(());
            }
            store.delete_proxy(&ProxyId::from(id)).await?;
            if !global.quiet {
                eprintln!("Proxy deleted");
            }
            Ok(())
        }

        ProxiesCommand::BulkStatus { status, ids } => {
            let status: ProxyStatus = status.into();
            let prompt = format!("Set status '{status}' on {} proxies?", ids.len());
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            let ids: Vec<ProxyId> = ids.into_iter().map(ProxyId::from).collect();
            store.bulk_update_status(&ids, status).await?;
            if !global.quiet {
                eprintln!("Updated {} proxies to {status}", ids.len());
            }
            Ok(())
        }

        ProxiesCommand::HealthCheck { id } => {
            let result = store.run_health_check(&ProxyId::from(id)).await?;
            let out = output::render_single(
                &global.output(),
                &result,
                |r| health_detail(r, color),
                |r| r.status.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProxiesCommand::Summary => {
            store.refresh().await?;
            let summary = store.summary();
            let out = output::render_single(&global.output(), &summary, summary_detail, |s| {
                s.total.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StatusArg;
    use relaydeck_core::HealthStatus;

    fn record() -> ProxyRecord {
        ProxyRecord {
            id: ProxyId::from("p1"),
            name: "East Campus".into(),
            description: None,
            server_location: "Accra".into(),
            status: ProxyStatus::Maintenance,
            health_status: HealthStatus::Warning,
            current_active_streams: 3,
            max_concurrent_streams: 8,
            church_branch_id: None,
        }
    }

    #[test]
    fn row_shows_stream_occupancy() {
        let row = ProxyRow::from(&record());
        assert_eq!(row.streams, "3/8");
        assert_eq!(row.status, "maintenance");
        assert!(row.branch.is_empty());
    }

    #[test]
    fn detail_without_color_is_plain() {
        let text = detail(&record(), false);
        assert!(text.contains("Status:      maintenance"));
        assert!(text.contains("Available:   no"));
        assert!(text.contains("Description: -"));
    }

    #[test]
    fn list_args_map_to_filter() {
        let args = ProxyListArgs {
            status: Some(StatusArg::Active),
            health: None,
            branch: Some("b-7".into()),
            search: Some("hall".into()),
            available: false,
            server_side: false,
        };
        let filter = list_filter(&args);
        assert_eq!(filter.status, Some(ProxyStatus::Active));
        assert_eq!(filter.church_branch_id.as_deref(), Some("b-7"));
        assert!(filter.health_status.is_none());
    }
}
