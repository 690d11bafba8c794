//! Persona management service

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::traits::PersonaStore;
use crate::types::{CreatePersonaRequest, Persona, PlatformSetting, UpdatePersonaRequest};
use crate::utils::datetime::{next_timestamp, now_millis};

const MAX_NAME_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 1000;
const MAX_HASHTAGS: usize = 30;
const COPY_SUFFIX: &str = " (Copy)";

/// Persona management service
pub struct PersonaService {
    store: Arc<dyn PersonaStore>,
}

impl PersonaService {
    #[must_use]
    pub fn new(store: Arc<dyn PersonaStore>) -> Self {
        Self { store }
    }

    /// List all personas
    pub async fn list_personas(&self) -> CoreResult<Vec<Persona>> {
        self.store.list().await
    }

    /// Get persona based on ID
    pub async fn get_persona(&self, id: &str) -> CoreResult<Option<Persona>> {
        self.store.find_by_id(id).await
    }

    async fn require(&self, id: &str) -> CoreResult<Persona> {
        self.get_persona(id)
            .await?
            .ok_or_else(|| CoreError::PersonaNotFound(id.to_string()))
    }

    /// Create a persona with a new id
    pub async fn create_persona(&self, request: CreatePersonaRequest) -> CoreResult<Persona> {
        let now = now_millis();
        let persona = Persona {
            id: uuid::Uuid::new_v4().to_string(),
            name: normalize_name(&request.name)?,
            description: normalize_description(&request.description)?,
            tone: request.tone,
            style: request.style,
            voice: request.voice,
            platform_settings: normalize_settings(request.platform_settings)?,
            created_at: now,
            updated_at: now,
            github_repo: None,
        };

        let saved = self.store.save(persona).await?;
        log::info!("Created persona {} ({})", saved.id, saved.name);
        Ok(saved)
    }

    /// Apply a partial update
    ///
    /// Always stamps a new `updated_at`, strictly later than the previous one.
    pub async fn update_persona(&self, request: UpdatePersonaRequest) -> CoreResult<Persona> {
        let mut persona = self.require(&request.id).await?;

        if let Some(name) = request.name {
            persona.name = normalize_name(&name)?;
        }
        if let Some(description) = request.description {
            persona.description = normalize_description(&description)?;
        }
        if let Some(tone) = request.tone {
            persona.tone = tone;
        }
        if let Some(style) = request.style {
            persona.style = style;
        }
        if let Some(voice) = request.voice {
            persona.voice = voice;
        }
        if let Some(settings) = request.platform_settings {
            persona.platform_settings = normalize_settings(settings)?;
        }
        persona.updated_at = next_timestamp(Some(persona.updated_at));

        let updated = self.store.update(persona).await?;
        log::info!("Updated persona {}", updated.id);
        Ok(updated)
    }

    /// Delete a persona
    pub async fn delete_persona(&self, id: &str) -> CoreResult<()> {
        let persona = self.require(id).await?;
        self.store.delete(&persona.id).await?;
        log::info!("Deleted persona {} ({})", persona.id, persona.name);
        Ok(())
    }

    /// Copy a persona under a new id, without its remote reference
    pub async fn duplicate_persona(&self, id: &str) -> CoreResult<Persona> {
        let source = self.require(id).await?;
        let now = now_millis();

        let keep = MAX_NAME_LENGTH - COPY_SUFFIX.chars().count();
        let base: String = source.name.chars().take(keep).collect();
        let copy = Persona {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("{}{COPY_SUFFIX}", base.trim_end()),
            created_at: now,
            updated_at: now,
            github_repo: None,
            ..source
        };

        let saved = self.store.save(copy).await?;
        log::info!("Duplicated persona {id} as {}", saved.id);
        Ok(saved)
    }
}

fn normalize_name(name: &str) -> CoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::ValidationError(
            "Persona name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::ValidationError(format!(
            "Persona name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

fn normalize_description(description: &str) -> CoreResult<String> {
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::ValidationError(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(description.to_string())
}

fn normalize_settings(settings: Vec<PlatformSetting>) -> CoreResult<Vec<PlatformSetting>> {
    let mut seen = HashSet::new();
    settings
        .into_iter()
        .map(|mut setting| {
            if !seen.insert(setting.platform) {
                return Err(CoreError::ValidationError(format!(
                    "Platform '{}' is configured more than once",
                    setting.platform
                )));
            }
            if let Some(max) = setting.max_length {
                let limit = setting.platform.max_post_length();
                if max == 0 || max > limit {
                    return Err(CoreError::ValidationError(format!(
                        "Max length for {} must be between 1 and {limit}",
                        setting.platform
                    )));
                }
            }
            setting.hashtags = normalize_hashtags(setting.hashtags)?;
            setting.custom_instructions = setting
                .custom_instructions
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            Ok(setting)
        })
        .collect()
}

/// Strip the leading `#`, drop blanks, dedupe case-insensitively keeping the first spelling.
fn normalize_hashtags(hashtags: Vec<String>) -> CoreResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for tag in hashtags {
        let tag = tag.trim().trim_start_matches('#');
        if tag.is_empty() {
            continue;
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(CoreError::ValidationError(format!(
                "Hashtag cannot contain whitespace: '{tag}'"
            )));
        }
        if seen.insert(tag.to_lowercase()) {
            normalized.push(tag.to_string());
        }
    }
    if normalized.len() > MAX_HASHTAGS {
        return Err(CoreError::ValidationError(format!(
            "At most {MAX_HASHTAGS} hashtags per platform"
        )));
    }
    Ok(normalized)
}
