//! Human-readable rendering of command results.

use std::fmt::Write as _;

use serde::Serialize;
use ubikial_core::types::{LinkedAccountSummary, Persona, SyncReport};
use ubikial_core::utils::datetime;

/// Print `value` as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn persona_table(personas: &[Persona]) -> String {
    if personas.is_empty() {
        return "No personas.".to_string();
    }

    let id_width = personas.iter().map(|p| p.id.len()).max().unwrap_or(0).max(2);
    let name_width = personas
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = format!("{:<id_width$}  {:<name_width$}  {:<13}  SYNCED\n", "ID", "NAME", "TONE");
    for p in personas {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<name_width$}  {:<13}  {}",
            p.id,
            p.name,
            p.tone.as_str(),
            if p.github_repo.is_some() { "yes" } else { "no" }
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn persona_detail(p: &Persona) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", p.name, p.id);
    if !p.description.is_empty() {
        let _ = writeln!(out, "  {}", p.description);
    }
    let _ = writeln!(out, "Tone:       {}", p.tone);
    let _ = writeln!(out, "Style:      {}", p.style);
    let _ = writeln!(out, "Voice:      {}", p.voice);
    let _ = writeln!(out, "Created:    {}", datetime::format(&p.created_at));
    let _ = writeln!(out, "Updated:    {}", datetime::format(&p.updated_at));
    if let Some(repo) = &p.github_repo {
        let _ = writeln!(out, "Repository: {repo}");
    }

    if p.platform_settings.is_empty() {
        out.push_str("Platforms:  none");
        return out;
    }
    out.push_str("Platforms:");
    for s in &p.platform_settings {
        let _ = write!(
            out,
            "\n  {:<10} {:<8} max {}",
            s.platform.as_str(),
            if s.enabled { "enabled" } else { "disabled" },
            s.effective_max_length()
        );
        if !s.hashtags.is_empty() {
            let tags: Vec<String> = s.hashtags.iter().map(|t| format!("#{t}")).collect();
            let _ = write!(out, "  {}", tags.join(" "));
        }
    }
    out
}

pub fn sync_summary(report: &SyncReport) -> String {
    if !report.has_changes() {
        return format!("Already in sync ({} personas).", report.unchanged);
    }
    format!(
        "Synced {} personas: {} pushed, {} pulled, {} imported, {} unchanged.",
        report.total(),
        report.pushed,
        report.pulled,
        report.imported,
        report.unchanged
    )
}

pub fn accounts_table(accounts: &[LinkedAccountSummary]) -> String {
    if accounts.is_empty() {
        return "No linked accounts.".to_string();
    }

    let mut out = String::new();
    for a in accounts {
        let expiry = match (&a.expires_at, a.expired) {
            (_, true) => "expired".to_string(),
            (Some(at), false) => format!("expires {}", datetime::format(at)),
            (None, false) => "no expiry".to_string(),
        };
        let _ = writeln!(out, "{:<10} {:<30} {expiry}", a.platform.as_str(), a.handle);
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use ubikial_core::types::{Platform, PlatformSetting, Style, Tone, Voice};

    fn persona(id: &str, name: &str) -> Persona {
        let at = DateTime::from_timestamp_millis(1_714_557_600_000).unwrap();
        Persona {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            tone: Tone::Humorous,
            style: Style::Storytelling,
            voice: Voice::Brand,
            platform_settings: Vec::new(),
            created_at: at,
            updated_at: at,
            github_repo: None,
        }
    }

    #[test]
    fn empty_tables() {
        assert_eq!(persona_table(&[]), "No personas.");
        assert_eq!(accounts_table(&[]), "No linked accounts.");
    }

    #[test]
    fn persona_table_aligns_columns() {
        let mut synced = persona("p-2", "Brand voice");
        synced.github_repo = Some("octocat/ubikial-persona-p-2".to_string());
        let table = persona_table(&[persona("p-1", "Jokes"), synced]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID   NAME"));
        assert!(lines[1].starts_with("p-1  Jokes"));
        assert!(lines[1].ends_with("no"));
        assert!(lines[2].ends_with("yes"));
    }

    #[test]
    fn persona_detail_lists_platforms() {
        let mut p = persona("p-1", "Jokes");
        let mut setting = PlatformSetting::enabled(Platform::Bluesky);
        setting.hashtags = vec!["rust".to_string()];
        p.platform_settings.push(setting);

        let detail = persona_detail(&p);
        assert!(detail.starts_with("Jokes (p-1)"));
        assert!(detail.contains("Updated:    2024-05-01T10:00:00.000Z"));
        assert!(detail.contains("bluesky    enabled  max 300  #rust"));
        assert!(!detail.contains("Repository:"));
    }

    #[test]
    fn sync_summary_without_changes() {
        let report = SyncReport {
            unchanged: 3,
            ..Default::default()
        };
        assert_eq!(sync_summary(&report), "Already in sync (3 personas).");
    }

    #[test]
    fn sync_summary_with_changes() {
        let report = SyncReport {
            pushed: 1,
            pulled: 1,
            imported: 1,
            unchanged: 0,
        };
        assert_eq!(
            sync_summary(&report),
            "Synced 3 personas: 1 pushed, 1 pulled, 1 imported, 0 unchanged."
        );
    }

    #[test]
    fn accounts_table_marks_expired() {
        let linked = DateTime::from_timestamp_millis(1_714_557_600_000).unwrap();
        let table = accounts_table(&[LinkedAccountSummary {
            platform: Platform::Twitter,
            handle: "@ubikial".to_string(),
            expires_at: Some(linked),
            linked_at: linked,
            expired: true,
        }]);
        assert!(table.starts_with("twitter"));
        assert!(table.ends_with("expired"));
    }
}
