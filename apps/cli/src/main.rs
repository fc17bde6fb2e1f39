use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::StegoClient;
use shared::domain::StagedFile;

#[derive(Parser, Debug)]
#[command(name = "stegodrop", about = "Hide and reveal messages via a steganography server")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a message inside a cover file and save the encoded result.
    Encode {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        message: String,
        #[arg(long)]
        password: Option<String>,
        /// Output path; defaults to the server-suggested filename.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract the hidden message from a stego file.
    Decode {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let client = StegoClient::new(&args.server_url)?;

    match args.command {
        Command::Encode {
            file,
            message,
            password,
            output,
        } => {
            let staged = StagedFile::from_path(&file)
                .with_context(|| format!("could not read {}", file.display()))?;
            let artifact = client
                .encode(&staged, &message, password.as_deref())
                .await?;
            let output = output.unwrap_or_else(|| PathBuf::from(&artifact.filename));
            std::fs::write(&output, &artifact.bytes)
                .with_context(|| format!("could not write {}", output.display()))?;
            println!("Wrote encoded file to {}", output.display());
        }
        Command::Decode { file, password } => {
            let staged = StagedFile::from_path(&file)
                .with_context(|| format!("could not read {}", file.display()))?;
            let message = client.decode(&staged, password.as_deref()).await?;
            println!("{message}");
        }
    }

    Ok(())
}
