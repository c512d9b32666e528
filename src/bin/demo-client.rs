use std::path::PathBuf;

use clap::Parser;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "demo-client")]
#[command(about = "Post texts and images to a vision-relay demo endpoint", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:9001/event")]
    url: String,

    /// Text inputs, sent as input-text-0, input-text-1, ...
    #[arg(short, long = "text")]
    texts: Vec<String>,

    /// Image files, sent as input-image-0, input-image-1, ...
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Relay the results to this browser socket instead of returning them.
    #[arg(short, long)]
    socket_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut form = Form::new();
    for (i, text) in cli.texts.iter().enumerate() {
        form = form.text(format!("input-text-{}", i), text.clone());
    }
    for (i, path) in cli.images.iter().enumerate() {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("image-{}", i));
        form = form.part(format!("input-image-{}", i), Part::bytes(bytes).file_name(file_name));
    }
    if let Some(socket_id) = cli.socket_id {
        form = form.text("socket-id", socket_id);
    }

    let res = reqwest::Client::new()
        .post(&cli.url)
        .multipart(form)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: demo server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
