mod cli;
mod platform;

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use leadly_core::{CoreSettings, HealthState, JobState, Msg, RefreshPolicy};
use leadly_engine::{ApiSettings, EngineConfig, EngineHandle};
use leadly_logging::{leadly_info, mask_secret};

use cli::{Cli, Commands, GlobalOptions, KeyCommands, RefreshPolicyArg, SubredditCommands};
use platform::app::Session;
use platform::effects::EffectRunner;
use platform::persistence::{config_dir, CredentialStore, KeySource};
use platform::ui::render::{render, state_label, Panel};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config_dir = config_dir();
    platform::logging::initialize(cli.options.log_to, cli.options.verbose, &config_dir);

    let store = CredentialStore::in_dir(&config_dir);
    let mut out = io::stdout().lock();

    run(cli.command, &cli.options, &store, &mut out)
}

fn connect(options: &GlobalOptions, store: &CredentialStore) -> Result<Session> {
    let (api_key, source) = store.resolve(options.api_key.as_deref());
    leadly_info!(
        "Connecting to {} with {:?} key {}",
        options.api_url,
        source,
        mask_secret(&api_key)
    );

    let config = EngineConfig {
        api: ApiSettings {
            base_url: options.api_url.clone(),
            api_key,
            request_timeout: Duration::from_secs(options.request_timeout_secs),
            ..ApiSettings::default()
        },
        poll_interval: Duration::from_millis(options.poll_interval_ms),
    };
    let engine = EngineHandle::new(config).context("failed to start the API engine")?;

    let settings = CoreSettings {
        max_poll_failures: options.max_poll_failures,
        refresh_policy: match options.refresh_policy {
            RefreshPolicyArg::Latest => RefreshPolicy::LatestRequest,
            RefreshPolicyArg::LastResponse => RefreshPolicy::LastResponse,
        },
    };
    Ok(Session::new(settings, EffectRunner::new(engine)))
}

fn run<W: Write>(
    command: Commands,
    options: &GlobalOptions,
    store: &CredentialStore,
    out: &mut W,
) -> Result<ExitCode> {
    match command {
        Commands::Search {
            subreddits,
            query,
            keywords,
            limit,
        } => {
            let mut session = connect(options, store)?;
            let mut edits = Vec::new();
            edits.extend(subreddits.map(Msg::SubredditsChanged));
            edits.extend(query.map(Msg::QueryChanged));
            edits.extend(keywords.map(Msg::KeywordsChanged));
            edits.extend(limit.map(|limit| Msg::LimitChanged(Some(limit))));
            session.prefill(edits);

            session.dispatch(Msg::SearchSubmitted);
            let view = session.run_until_settled(out, &[Panel::Job])?;

            let state = view.job.as_ref().map_or(JobState::Idle, |job| job.state);
            if state == JobState::Completed {
                writeln!(out)?;
                for line in render(&view, &[Panel::Leads]) {
                    writeln!(out, "{line}")?;
                }
            }
            writeln!(out, "Search finished: {}", state_label(state))?;
            let succeeded = state == JobState::Completed && view.poll_notice.is_none();
            Ok(exit_code(succeeded))
        }
        Commands::Leads => {
            let mut session = connect(options, store)?;
            session.dispatch(Msg::RefreshLeadsClicked);
            let view = session.run_until_settled(out, &[Panel::Leads])?;
            Ok(exit_code(view.leads.notice.is_none()))
        }
        Commands::Subreddits { command } => {
            let mut session = connect(options, store)?;
            match command {
                SubredditCommands::List => session.dispatch(Msg::LoadSubredditsRequested),
                SubredditCommands::Add { name } => {
                    session.dispatch(Msg::AddSubredditRequested(name))
                }
            }
            let view = session.run_until_settled(out, &[Panel::Communities])?;
            Ok(exit_code(!view.communities.failed))
        }
        Commands::Health => {
            let mut session = connect(options, store)?;
            session.dispatch(Msg::HealthCheckRequested);
            let view = session.run_until_settled(out, &[Panel::Health])?;
            Ok(exit_code(view.health == HealthState::Healthy))
        }
        Commands::Key { command } => run_key_command(command, options, store, out),
    }
}

fn run_key_command<W: Write>(
    command: KeyCommands,
    options: &GlobalOptions,
    store: &CredentialStore,
    out: &mut W,
) -> Result<ExitCode> {
    match command {
        KeyCommands::Set { key } => {
            if key.trim().is_empty() {
                writeln!(out, "Refusing to store an empty API key")?;
                return Ok(ExitCode::FAILURE);
            }
            store
                .save(&key)
                .with_context(|| format!("failed to store API key in {:?}", store.path()))?;
            writeln!(out, "API key stored in {}", store.path().display())?;
        }
        KeyCommands::Show => {
            let (key, source) = store.resolve(options.api_key.as_deref());
            let origin = match source {
                KeySource::Explicit => "from --api-key / LEADLY_API_KEY",
                KeySource::Stored => "stored",
                KeySource::Placeholder => "placeholder, none configured",
            };
            writeln!(out, "API key: {} ({origin})", mask_secret(&key))?;
        }
        KeyCommands::Clear => {
            store
                .clear()
                .with_context(|| format!("failed to remove {:?}", store.path()))?;
            writeln!(out, "Stored API key removed")?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
