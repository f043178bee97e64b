use log_tailer::{Charset, Error, Tailer, TailerConfig, TailerListener};
use std::env;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: {} [--from-start] [--reopen] [--notify] [--delay-ms N] [--charset NAME] <file_path>";

/// Prints lines to stdout and notices through tracing.
struct StdoutListener {
    failed: Arc<AtomicBool>,
}

impl TailerListener for StdoutListener {
    fn file_not_found(&mut self) {
        warn!("File not found, waiting for it to appear");
    }

    fn file_rotated(&mut self) {
        info!("File rotated, reading from the beginning");
    }

    fn handle_line(&mut self, line: String) {
        println!("{}", line);
    }

    fn handle_error(&mut self, error: Error) {
        if matches!(error, Error::RetriesExhausted { .. }) {
            self.failed.store(true, Ordering::Release);
        }
        warn!("{}", error);
    }
}

fn usage(program: &str) -> ! {
    eprintln!("{}", USAGE.replace("{}", program));
    process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("log-tailer");

    let mut file_arg: Option<String> = None;
    let mut from_start = false;
    let mut reopen = None;
    let mut notify = false;
    let mut delay = None;
    let mut charset = Charset::default();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--from-start" => from_start = true,
            "--reopen" => reopen = Some(true),
            "--notify" => notify = true,
            "--delay-ms" => match rest.next().and_then(|v| v.parse::<u64>().ok()) {
                Some(ms) => delay = Some(Duration::from_millis(ms)),
                None => usage(program),
            },
            "--charset" => match rest.next().and_then(|v| v.parse::<Charset>().ok()) {
                Some(parsed) => charset = parsed,
                None => usage(program),
            },
            path if file_arg.is_none() && !path.starts_with("--") => {
                file_arg = Some(path.to_string())
            }
            _ => usage(program),
        }
    }

    let Some(file_path) = file_arg else {
        usage(program);
    };

    let mut config = TailerConfig::builder(&file_path)
        .tail_from_end(!from_start)
        .charset(charset)
        .notify_wakeup(notify);
    if let Some(reopen) = reopen {
        config = config.reopen(reopen);
    }
    if let Some(delay) = delay {
        config = config.delay(delay);
    }

    let config = match config.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error setting up tailer: {}", e);
            process::exit(1);
        }
    };

    let failed = Arc::new(AtomicBool::new(false));
    let handle = Tailer::spawn(
        config,
        StdoutListener {
            failed: failed.clone(),
        },
    );
    info!("Tailing file: {}", file_path);

    tokio::select! {
        _ = handle.join() => {}
        _ = tokio::signal::ctrl_c() => {
            handle.stop_timeout(Duration::from_secs(2)).await;
        }
    }

    if failed.load(Ordering::Acquire) {
        process::exit(1);
    }
}
