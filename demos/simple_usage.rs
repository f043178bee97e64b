use log_tailer::{TailerConfig, tail_lines};
use std::io::Write;
use std::time::Duration;
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("log_tailer_simple_usage.log");
    std::fs::write(&path, "2023-01-01 10:00:00 INFO Starting application\n")?;

    // Follow the file from its beginning, emitting one String per line
    let config = TailerConfig::builder(&path)
        .delay(Duration::from_millis(100))
        .tail_from_end(false)
        .build()?;
    let mut stream = tail_lines(config)?;

    println!("Tailing {} ...", path.display());

    let writer_path = path.clone();
    tokio::spawn(async move {
        for i in 1..=3 {
            tokio::time::sleep(Duration::from_millis(250)).await;
            if let Ok(mut file) = std::fs::OpenOptions::new().append(true).open(&writer_path) {
                let _ = writeln!(file, "2023-01-01 10:00:0{} INFO Request {} served", i, i);
            }
        }
    });

    let mut count = 0;
    while let Some(line) = stream.next().await {
        match line {
            Ok(line) => println!("  [{}]: {}", count + 1, line),
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }

        count += 1;
        if count >= 4 {
            break;
        }
    }

    std::fs::remove_file(&path)?;
    Ok(())
}
