use log_tailer::{Error, Tailer, TailerConfig, TailerHandle, TailerListener};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Log Tailer Comprehensive Example ===\n");

    let dir = std::env::temp_dir().join("log_tailer_comprehensive");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("app.log");
    let _ = std::fs::remove_file(&path);

    // Example 1: A listener that counts log levels and reports lifecycle events
    println!("1. Listener with lifecycle notifications:");
    let config = TailerConfig::builder(&path)
        .delay(Duration::from_millis(100))
        .tail_from_end(false)
        .build()?;
    let handle = Tailer::spawn(config, LevelCounter::default());

    // The file does not exist yet; the listener hears about it once
    tokio::time::sleep(Duration::from_millis(200)).await;
    write_lines(&path, &["INFO Starting application", "WARN High memory usage"])?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("\n{}\n", "=".repeat(50));

    // Example 2: Rotation by rename + recreate
    println!("2. Rotation - moving the file aside and starting a new one:");
    std::fs::rename(&path, dir.join("app.log.1"))?;
    write_lines(&path, &["INFO Fresh file after rotation", "ERROR Request timeout"])?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    println!("\n{}\n", "=".repeat(50));

    // Example 3: Stopping with a bounded wait
    println!("3. Stopping the tailer:");
    let exited = handle.stop_timeout(Duration::from_secs(1)).await;
    println!("  Loop exited: {}", exited);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

fn write_lines(path: &Path, lines: &[&str]) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

#[derive(Default)]
struct LevelCounter {
    counts: HashMap<String, usize>,
}

impl TailerListener for LevelCounter {
    fn init(&mut self, handle: &TailerHandle) {
        println!("  Tailing {}", handle.file().display());
    }

    fn file_not_found(&mut self) {
        println!("  File not found yet, waiting");
    }

    fn file_rotated(&mut self) {
        println!("  File rotated, counts so far: {:?}", self.counts);
    }

    fn handle_line(&mut self, line: String) {
        let level = line.split_whitespace().next().unwrap_or("").to_string();
        *self.counts.entry(level).or_insert(0) += 1;
        println!("    {}", line);
    }

    fn handle_error(&mut self, error: Error) {
        eprintln!("  Error: {}", error);
    }

    fn end_of_file_reached(&mut self) {
        println!("  Caught up with the end of the file");
    }
}
