//! Config subcommand handlers.

use std::collections::BTreeMap;

use dialoguer::{Input, Select};
use serde::Serialize;

use relaydeck_config::{self as config, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Redacted view ───────────────────────────────────────────────────

/// What `config show` prints: plaintext tokens are masked in every format.
#[derive(Serialize)]
struct RedactedConfig<'a> {
    default_profile: Option<&'a str>,
    output: &'a str,
    insecure: bool,
    timeout: u64,
    profiles: BTreeMap<&'a str, Profile>,
}

impl<'a> From<&'a Config> for RedactedConfig<'a> {
    fn from(cfg: &'a Config) -> Self {
        let profiles = cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let mut p = p.clone();
                if p.token.is_some() {
                    p.token = Some(MASK.into());
                }
                (name.as_str(), p)
            })
            .collect();
        Self {
            default_profile: cfg.default_profile.as_deref(),
            output: &cfg.defaults.output,
            insecure: cfg.defaults.insecure,
            timeout: cfg.defaults.timeout,
            profiles,
        }
    }
}

fn format_redacted(cfg: &RedactedConfig<'_>) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.output);
    let _ = writeln!(out, "insecure = {}", cfg.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if let Some(ref push) = p.push_url {
            let _ = writeln!(out, "push_url = \"{push}\"");
        }
        if let Some(ref token) = p.token {
            let _ = writeln!(out, "token = \"{token}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

// ── Prompts ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token() -> Result<String, CliError> {
    let token = rpassword::prompt_password("Session token: ").map_err(prompt_err)?;
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

/// Offer keyring or plaintext storage for `token`.
///
/// Returns `Some(token)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_token_storage(token: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_token(profile_name, token)?;
        eprintln!("   ✓ Token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// `cfg` is the already-loaded configuration; `init` edits and saves it.
pub fn handle(args: ConfigArgs, global: &GlobalOpts, mut cfg: Config) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("relaydeck configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());


            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(active_profile_name(global, &cfg))
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Proxy API URL")
                .default("https://dashboard.example.org/api/streaming-proxies".into())
                .interact_text()
                .map_err(prompt_err)?;

            let push_url: String = Input::new()
                .with_prompt("Push channel URL (blank to skip)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let token = prompt_token()?;
            let token = prompt_token_storage(&token, &profile_name)?;

            let profile = Profile {
                api_url,
                push_url: Some(push_url).filter(|u| !u.trim().is_empty()),
                token,
                ..Profile::default()
            };

            // Validate before anything is written.
            config::profile_to_store_config(&profile, &profile_name, &cfg.defaults)?;

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: relaydeck proxies summary");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let view = RedactedConfig::from(&cfg);
            let out = output::render_single(&global.output(), &view, format_redacted, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set token ───────────────────────────────────────────────
        ConfigCommand::SetToken => {
            let profile_name = active_profile_name(global, &cfg);
            let token = match global.token {
                Some(ref token) => token.clone(),
                None => prompt_token()?,
            };
            config::store_token(&profile_name, &token)?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: relaydeck config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with_token() -> Config {
        let mut profiles = HashMap::new();
        profiles.insert(
            "home".to_string(),
            Profile {
                api_url: "https://dash.example.org/api".into(),
                token: Some("super-secret".into()),
                token_env: Some("HOME_TOKEN".into()),
                ..Profile::default()
            },
        );
        Config {
            default_profile: Some("home".into()),
            defaults: config::Defaults::default(),
            profiles,
        }
    }

    #[test]
    fn show_masks_plaintext_tokens() {
        let cfg = config_with_token();
        let text = format_redacted(&RedactedConfig::from(&cfg));
        assert!(!text.contains("super-secret"));
        assert!(text.contains("token = \"****\""));
        assert!(text.contains("token_env = \"HOME_TOKEN\""));
        assert!(text.contains("[profiles.home]"));
    }

    #[test]
    fn structured_show_is_masked_too() {
        let cfg = config_with_token();
        let view = RedactedConfig::from(&cfg);
        let json = serde_json::to_string(&view).unwrap_or_default();
        assert!(!json.contains("super-secret"));
        assert!(json.contains(MASK));
    }
}
