//! Command dispatch.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use ubikial_app::{AppConfig, AppState, UserSession};
use ubikial_core::types::{
    CreatePersonaRequest, LinkAccountRequest, PlatformSetting, Style, Tone, UpdatePersonaRequest,
    Voice,
};

use crate::cli::{Cli, Commands, LinkArgs, PersonaCommand, PersonaFields};
use crate::output;

/// Load configuration, open the user's session, run the command and close
/// the session (flushing local storage) even when the command failed.
pub async fn run(cli: Cli) -> Result<()> {
    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    tracing::debug!(?config, "Configuration loaded");

    let user = config.user()?.to_string();
    let state = AppState::from_config(&config)
        .await
        .context("Failed to initialize storage")?;
    let session = state.open_session(&user).await?;

    let result = dispatch(&session, &config, cli.command, cli.json).await;
    let closed = session.close().await.context("Failed to flush storage");
    result?;
    closed
}

async fn dispatch(
    session: &UserSession,
    config: &AppConfig,
    command: Commands,
    json: bool,
) -> Result<()> {
    match command {
        Commands::Persona { command } => persona(session, command, json).await,
        Commands::Sync => {
            let report = session.sync().await.context("Sync failed")?;
            if json {
                output::print_json(&report)
            } else {
                println!("{}", output::sync_summary(&report));
                Ok(())
            }
        }
        Commands::Status => status(session, config, json).await,
        Commands::Link(args) => link(session, args, json).await,
        Commands::Unlink { platform } => {
            session.vault()?.unlink(platform).await?;
            println!("Unlinked {platform}.");
            Ok(())
        }
        Commands::Accounts => {
            let accounts = session.vault()?.list().await?;
            if json {
                output::print_json(&accounts)
            } else {
                println!("{}", output::accounts_table(&accounts));
                Ok(())
            }
        }
    }
}

async fn persona(session: &UserSession, command: PersonaCommand, json: bool) -> Result<()> {
    let service = &session.persona_service;
    match command {
        PersonaCommand::List => {
            let personas = service.list_personas().await?;
            if json {
                output::print_json(&personas)
            } else {
                println!("{}", output::persona_table(&personas));
                Ok(())
            }
        }
        PersonaCommand::Show { id } => {
            let Some(persona) = service.get_persona(&id).await? else {
                bail!("Persona not found: {id}");
            };
            if json {
                output::print_json(&persona)
            } else {
                println!("{}", output::persona_detail(&persona));
                Ok(())
            }
        }
        PersonaCommand::Create { name, fields } => {
            let platform_settings = platform_settings(&fields)?.unwrap_or_default();
            let created = service
                .create_persona(CreatePersonaRequest {
                    name,
                    description: fields.description.unwrap_or_default(),
                    tone: fields.tone.unwrap_or(Tone::Professional),
                    style: fields.style.unwrap_or(Style::Concise),
                    voice: fields.voice.unwrap_or(Voice::FirstPerson),
                    platform_settings,
                })
                .await?;
            report(&created, json, "Created")
        }
        PersonaCommand::Update { id, name, fields } => {
            let request = UpdatePersonaRequest {
                id,
                name,
                platform_settings: platform_settings(&fields)?,
                description: fields.description,
                tone: fields.tone,
                style: fields.style,
                voice: fields.voice,
            };
            if request.is_empty() {
                bail!("Nothing to update; pass at least one field");
            }
            let updated = service.update_persona(request).await?;
            report(&updated, json, "Updated")
        }
        PersonaCommand::Delete { id } => {
            service.delete_persona(&id).await?;
            println!("Deleted persona {id}.");
            Ok(())
        }
        PersonaCommand::Duplicate { id } => {
            let copy = service.duplicate_persona(&id).await?;
            report(&copy, json, "Created")
        }
    }
}

fn report(persona: &ubikial_core::types::Persona, json: bool, verb: &str) -> Result<()> {
    if json {
        output::print_json(persona)
    } else {
        println!("{verb} persona {} ({}).", persona.name, persona.id);
        Ok(())
    }
}

/// Platform settings requested by flags; `None` when neither flag was given.
fn platform_settings(fields: &PersonaFields) -> Result<Option<Vec<PlatformSetting>>> {
    if let Some(path) = &fields.settings_file {
        return read_settings_file(path).map(Some);
    }
    if fields.platforms.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        fields
            .platforms
            .iter()
            .map(|p| PlatformSetting::enabled(*p))
            .collect(),
    ))
}

fn read_settings_file(path: &Path) -> Result<Vec<PlatformSetting>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid platform settings in {}", path.display()))
}

async fn link(session: &UserSession, args: LinkArgs, json: bool) -> Result<()> {
    let summary = session
        .vault()?
        .link(LinkAccountRequest {
            platform: args.platform,
            handle: args.handle,
            access_token: args.token,
            refresh_token: args.refresh_token,
            expires_in: args.expires_in,
        })
        .await?;
    if json {
        output::print_json(&summary)
    } else {
        println!("Linked {} as {}.", summary.platform, summary.handle);
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    user: String,
    backend: String,
    data_dir: String,
    store: ubikial_app::StoreKind,
    offline: bool,
    repository_host: bool,
    personas: usize,
    linked_accounts: Option<usize>,
}

async fn status(session: &UserSession, config: &AppConfig, json: bool) -> Result<()> {
    let personas = session.persona_service.list_personas().await?.len();
    let linked_accounts = match session.vault() {
        Ok(vault) => Some(vault.list().await?.len()),
        Err(_) => None,
    };
    let status = Status {
        user: session.user_id().to_string(),
        backend: session.backend_kind().to_string(),
        data_dir: config.data_dir().display().to_string(),
        store: config.store,
        offline: config.offline,
        repository_host: config.github.token.is_some(),
        personas,
        linked_accounts,
    };

    if json {
        return output::print_json(&status);
    }
    println!("User:      {}", status.user);
    println!("Storage:   {} ({:?} store)", status.backend, status.store);
    println!("Data dir:  {}", status.data_dir);
    println!(
        "GitHub:    {}",
        match (status.repository_host, status.offline) {
            (false, _) => "not configured",
            (true, true) => "configured (offline)",
            (true, false) => "configured",
        }
    );
    println!("Personas:  {}", status.personas);
    match status.linked_accounts {
        Some(n) => println!("Accounts:  {n} linked"),
        None => println!("Accounts:  vault locked (no passphrase)"),
    }
    Ok(())
}
