use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;

use log::{debug, error, info, warn};

use hsp_bridge::accessory::Accessory;
use hsp_bridge::client::HspClient;
use hsp_bridge::config::Config;
use hsp_bridge::indicator::HeatingIndicator;
use hsp_bridge::services::poller;
use hsp_bridge::state::DeviceState;
use hsp_bridge::stove::{StateSink, Stove};

/// Logs every published snapshot; warnings for device-reported faults.
struct LogSink;

impl StateSink for LogSink {
    fn publish(&self, state: &DeviceState, indicator: &HeatingIndicator) {
        debug!(
            "state: running={} mode={} is_temp={:.1} sp_temp={:.1} eco={} wprg={} brightness={}",
            state.running,
            state.mode,
            state.current_temperature,
            state.target_temperature,
            state.eco_mode_active,
            state.week_program_active,
            indicator.brightness()
        );
        if let Some(err) = &state.error {
            warn!("stove reports error: {}", err);
        }
    }
}

fn run() -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (host={}, interval={}s, timeout={}s, model={}, serial={})",
        cfg.host,
        cfg.interval.as_secs(),
        cfg.request_timeout.as_secs(),
        cfg.model_type,
        cfg.serial
    );

    // 2) Build client + stove core
    let client = HspClient::with_timeout(&cfg.host, cfg.request_timeout);
    let mut stove = Stove::new(client, cfg.pin.clone());
    stove.add_sink(Box::new(LogSink));
    let stove = Arc::new(stove);

    // 3) First poll up front so accessors serve real data before the first tick
    match stove.poll() {
        Ok(()) => {
            let state = stove.state();
            info!(
                "Connected to stove {} (sw {}), mode {}",
                state.device_info.serial_number, state.device_info.software_version, state.mode
            );
        }
        Err(e) => warn!("Initial poll failed, starting with unknown state: {}", e),
    }

    // 4) Outward capability surface
    let accessory = Accessory::new(
        Arc::clone(&stove),
        Accessory::all_capabilities(),
        cfg.model_type.clone(),
        cfg.serial.clone(),
    );
    info!(
        "Exposing accessory: {} {} (serial {})",
        accessory.manufacturer(),
        accessory.model_type(),
        accessory.serial_number()
    );

    // 5) Poll loop (foreground; the sender is held so the loop never stops)
    info!("Starting poll loop: interval={}s", cfg.interval.as_secs());
    let (_stop_tx, stop_rx) = mpsc::channel();
    poller::run_loop(&stove, cfg.interval, &stop_rx);

    Ok(())
}

fn configure_env_from_cli() -> Result<Option<PathBuf>, String> {
    let mut args = std::env::args_os();
    args.next(); // skip program name

    let mut env_file: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--env-file") => {
                let value = args
                    .next()
                    .ok_or_else(|| "`--env-file` requires a path argument".to_string())?;
                env_file = Some(PathBuf::from(value));
            }
            Some(s) if s.starts_with("--env-file=") => {
                let path_str = &s["--env-file=".len()..];
                if path_str.is_empty() {
                    return Err("`--env-file` requires a path argument".to_string());
                }
                env_file = Some(PathBuf::from(path_str));
            }
            Some(other) => return Err(format!("unrecognised argument: {}", other)),
            None => return Err("argument contains invalid UTF-8".to_string()),
        }
    }

    match env_file {
        Some(path) => {
            if !path.is_file() {
                return Err(format!("env file not found: {}", path.display()));
            }
            load_env_file(&path)?;
            Ok(Some(path))
        }
        None => {
            let default_path = Path::new(".env").to_path_buf();
            if default_path.is_file() {
                load_env_file(&default_path)?;
                Ok(Some(default_path))
            } else {
                Ok(None)
            }
        }
    }
}

fn load_env_file(path: &Path) -> Result<(), String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("{}:{}: missing '=' in assignment", path.display(), index + 1))?;
        let key = key.trim();
        if key.is_empty() || key.chars().any(|c| c.is_whitespace()) {
            return Err(format!(
                "{}:{}: invalid environment variable name",
                path.display(),
                index + 1
            ));
        }
        let value = strip_quotes(value.trim());

        // Values already supplied via the process environment win.
        if std::env::var_os(key).is_none() {
            // Mutating the process environment is unsafe on some targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    Ok(())
}

fn strip_quotes(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn main() {
    let loaded_env = match configure_env_from_cli() {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(path) = loaded_env.as_ref() {
        info!("Environment loaded from .env file: {}", path.display());
    }

    info!(
        "hsp-bridge {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
