use crate::output::Output;
use crate::ConfigCommands;
use class_booking_config::{Config, CredentialStore, PathManager, PASSWORD_ENV};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, paths: &PathManager, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(paths, output),
        ConfigCommands::Init { gym, username, force } => init_config(paths, &gym, username, force, output),
        ConfigCommands::SetPassword => set_password(paths, output),
        ConfigCommands::Path => show_paths(paths, output),
    }
}

/// Load and validate the configuration file
pub fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'fliip-booker config init --gym <name>' first.",
            config_file.display()
        ));
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

pub fn load_credential_store(paths: &PathManager) -> Result<CredentialStore> {
    let credentials_file = paths.credentials_file();
    let mut store = CredentialStore::new(credentials_file.clone());
    store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    Ok(store)
}

fn section(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn show_config(paths: &PathManager, output: &Output) -> Result<()> {
    let config_file = paths.config_file();
    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Create one with 'fliip-booker config init --gym <name>'.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let store = load_credential_store(paths)?;
    let password_source = if std::env::var(PASSWORD_ENV).map(|v| !v.is_empty()).unwrap_or(false) {
        "environment"
    } else if store.get_fliip_password().is_some() {
        "credentials file"
    } else {
        "not set"
    };
    let validation = config.validate();

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "config": config,
            "password": password_source,
            "valid": validation.is_ok(),
            "validation_error": validation.as_ref().err().map(|e| e.to_string()),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!("{}\n", config_file.display().to_string().dimmed());

    let mut portal = section("Portal");
    portal.add_row(vec!["Gym".to_string(), config.portal.gym.clone()]);
    portal.add_row(vec!["Login URL".to_string(), config.login_url()]);
    portal.add_row(vec![
        "Username".to_string(),
        config.portal.username.clone().unwrap_or_else(|| "(from FLIIP_USERNAME)".to_string()),
    ]);
    portal.add_row(vec!["Password".to_string(), password_source.to_string()]);
    portal.add_row(vec!["Language".to_string(), config.portal.language.clone()]);
    portal.add_row(vec!["Headless".to_string(), config.portal.headless.to_string()]);
    println!("{}\n", portal);

    let mut booking = section("Booking");
    booking.add_row(vec!["Lookahead".to_string(), format!("{} hours", config.booking.lookahead_hours)]);
    booking.add_row(vec![
        "Weeks".to_string(),
        match config.booking.max_weeks {
            Some(weeks) => weeks.to_string(),
            None => format!("{} (covers lookahead)", config.booking.weeks()),
        },
    ]);
    booking.add_row(vec!["Week order".to_string(), format!("{:?}", config.booking.week_order)]);
    booking.add_row(vec!["UI timeout".to_string(), format!("{} s", config.booking.ui_timeout_seconds)]);
    booking.add_row(vec![
        "Opening wait".to_string(),
        match config.booking.opening_wait_minutes {
            0 => "disabled".to_string(),
            minutes => format!("{} min", minutes),
        },
    ]);
    println!("{}\n", booking);

    let mut classes = section("Classes");
    match config.class_slots() {
        Ok(slots) => {
            for slot in slots {
                classes.add_row(vec![slot.weekday().to_string(), format!("{:02}:00", slot.hour())]);
            }
        }
        Err(e) => {
            classes.add_row(vec!["invalid".to_string(), e.to_string()]);
        }
    }
    println!("{}\n", classes);

    let mut notify = section("Notifications");
    notify.add_row(vec![
        "Webhook".to_string(),
        if config.notify.webhook_url.is_some() { "configured" } else { "not set" }.to_string(),
    ]);
    notify.add_row(vec![
        "Report dir".to_string(),
        config
            .notify
            .report_dir
            .clone()
            .unwrap_or_else(|| paths.reports_dir())
            .display()
            .to_string(),
    ]);
    if let Some(scheduler) = &config.scheduler {
        notify.add_row(vec!["Schedule".to_string(), scheduler.schedule.clone()]);
    }
    println!("{}\n", notify);

    match validation {
        Ok(()) => output.success("Configuration is valid"),
        Err(e) => output.error(format!("Configuration is invalid: {}", e)),
    }
    Ok(())
}

fn init_config(
    paths: &PathManager,
    gym: &str,
    username: Option<String>,
    force: bool,
    output: &Output,
) -> Result<()> {
    let config_file = paths.config_file();
    if config_file.exists() && !force {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file already exists at {} (use --force to overwrite)",
            config_file.display()
        ));
    }

    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;

    let mut config = Config::default_template(gym);
    config.portal.username = username;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration written to {}", config_file.display()));
    output.info("Edit the [classes] section to list your classes, then run 'fliip-booker config set-password'.");
    Ok(())
}

fn set_password(paths: &PathManager, output: &Output) -> Result<()> {
    let password = rpassword::prompt_password("Fliip password: ")
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read password: {}", e))?;
    if password.is_empty() {
        return Err(color_eyre::eyre::eyre!("Password cannot be empty"));
    }

    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;
    let mut store = load_credential_store(paths)?;
    store.set_fliip_password(password);
    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;

    output.success(format!("Password stored in {}", paths.credentials_file().display()));
    Ok(())
}

fn show_paths(paths: &PathManager, output: &Output) -> Result<()> {
    let entries = [
        ("config_file", paths.config_file()),
        ("credentials_file", paths.credentials_file()),
        ("log_dir", paths.log_dir().to_path_buf()),
        ("reports_dir", paths.reports_dir()),
        ("browser_profile_dir", paths.browser_profile_dir()),
        ("debug_dir", paths.debug_dir()),
    ];

    if output.is_human() {
        for (name, path) in &entries {
            output.info(format!("{:<20} {}", name, path.display()));
        }
    } else {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(name, path)| (name.to_string(), json!(path.display().to_string())))
            .collect();
        output.json(&serde_json::Value::Object(map));
    }
    Ok(())
}
