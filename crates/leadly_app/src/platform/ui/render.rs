use chrono::{DateTime, NaiveDateTime};
use leadly_core::{
    AppViewModel, CommunitiesView, HealthState, JobState, JobStatusView, Lead, LeadsView,
    EMPTY_LEADS_MESSAGE,
};

use super::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Job,
    Leads,
    Communities,
    Health,
}

/// Renders the requested panels of `view` as terminal lines.
pub fn render(view: &AppViewModel, panels: &[Panel]) -> Vec<String> {
    let mut lines = Vec::new();
    for panel in panels {
        match panel {
            Panel::Job => render_job_panel(view, &mut lines),
            Panel::Leads => render_leads(&view.leads, &mut lines),
            Panel::Communities => render_communities(&view.communities, &mut lines),
            Panel::Health => lines.push(health_line(view.health).to_string()),
        }
    }
    lines
}

fn render_job_panel(view: &AppViewModel, lines: &mut Vec<String>) {
    match &view.job {
        Some(job) => render_job(job, lines),
        None if !view.form.submit_enabled => lines.push(view.form.submit_label.to_string()),
        None => {}
    }
    if let Some(notice) = &view.poll_notice {
        lines.push(format!("  Notice: {notice}"));
    }
}

fn render_job(job: &JobStatusView, lines: &mut Vec<String>) {
    let job_label = if job.short_job_id.is_empty() {
        "(not started)".to_string()
    } else {
        format!("{}...", job.short_job_id)
    };
    lines.push(format!("[{}] Job: {}", job.state, job_label));

    if job.show_progress {
        lines.push(format!(
            "  {} {}%",
            progress_bar(job.progress),
            job.progress
        ));
    }

    if let Some(results) = job.results {
        lines.push(format!(
            "  Posts: {} | Comments: {} | Leads: {}",
            results.posts_processed, results.comments_processed, results.leads_found
        ));
    }

    if let Some(error) = &job.error {
        lines.push(format!("  Error: {error}"));
    }
}

/// Fixed-width bar; the filled share equals the progress percentage.
fn progress_bar(progress: u8) -> String {
    let progress = usize::from(progress.min(100));
    let filled = progress * PROGRESS_BAR_WIDTH / 100;
    format!(
        "[{}{}]",
        PROGRESS_FILLED.repeat(filled),
        PROGRESS_EMPTY.repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn render_leads(leads: &LeadsView, lines: &mut Vec<String>) {
    if leads.loading {
        lines.push("Loading leads...".to_string());
        return;
    }

    lines.push(format!("Found Leads ({})", leads.items.len()));
    if let Some(notice) = &leads.notice {
        lines.push(format!("  Notice: {notice}"));
    }
    if leads.is_empty() {
        lines.push(EMPTY_LEADS_MESSAGE.to_string());
        return;
    }
    for (index, lead) in leads.items.iter().enumerate() {
        render_lead(index + 1, lead, lines);
    }
}

fn render_lead(position: usize, lead: &Lead, lines: &mut Vec<String>) {
    lines.push(format!("{position}. {}", lead.title));
    if let Some(text) = lead.post_text.as_deref().map(excerpt).filter(|t| !t.is_empty()) {
        lines.push(format!("   {text}"));
    }
    lines.push(format!(
        "   r/{} | posted {} | {}",
        lead.subreddit_name,
        format_timestamp(&lead.created_at),
        lead.url
    ));
}

/// Collapses whitespace and cuts long bodies to a single line.
fn excerpt(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= EXCERPT_CHARS {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(TIMESTAMP_FORMAT).to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(parsed) => parsed.format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

fn render_communities(communities: &CommunitiesView, lines: &mut Vec<String>) {
    if let Some(notice) = &communities.notice {
        lines.push(notice.clone());
    }
    if communities.loading {
        lines.push("Loading subreddits...".to_string());
        return;
    }
    if !communities.loaded {
        return;
    }
    if communities.names.is_empty() {
        lines.push("No subreddits configured.".to_string());
        return;
    }
    lines.push(format!("Configured subreddits ({})", communities.names.len()));
    lines.extend(communities.names.iter().map(|name| format!("  r/{name}")));
}

fn health_line(health: HealthState) -> &'static str {
    match health {
        HealthState::Unknown => "Backend health: unknown",
        HealthState::Checking => "Checking backend...",
        HealthState::Healthy => "Backend is healthy",
        HealthState::Unreachable => "Backend is unreachable",
    }
}

/// Short label used in the final summary line of a search.
pub fn state_label(state: JobState) -> &'static str {
    match state {
        JobState::Idle => "Idle",
        JobState::Pending => "Pending",
        JobState::Processing => "Processing",
        JobState::Completed => "Completed",
        JobState::Failed => "Failed",
    }
}
