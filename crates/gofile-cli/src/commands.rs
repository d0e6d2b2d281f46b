//! Subcommand handlers

use crate::{Args, Command};
use anyhow::{bail, Context};
use gofile_client::{
    progress_callback, Config, FolderOption, GofileClient, ProgressCallback, StagingStrategy,
    UploadProgress,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Build the client from the global flags
pub fn client(args: &Args) -> anyhow::Result<GofileClient> {
    let config = Config::new(&args.api_url)
        .with_token(&args.token)
        .with_timeout(Duration::from_secs(args.timeout));
    GofileClient::new(config).context("failed to create client")
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let client = client(&args)?;

    match args.command {
        Command::Server => print_json(&serde_json::json!({ "server": client.get_server().await? })),
        Command::Account => {
            require_token(&args.token)?;
            print_json(&client.get_account_details().await?)
        }
        Command::Mkdir { parent, name } => {
            require_token(&args.token)?;
            print_json(&client.create_folder(&parent, &name).await?)
        }
        Command::Cp { dest, ids } => {
            require_token(&args.token)?;
            client.copy_content(&dest, &ids).await?;
            tracing::info!("Copied {} item(s) to {}", ids.len(), dest);
            Ok(())
        }
        Command::Rm { ids } => {
            require_token(&args.token)?;
            client.delete_content(&ids).await?;
            tracing::info!("Deleted {} item(s)", ids.len());
            Ok(())
        }
        Command::SetOption {
            folder,
            option,
            value,
        } => {
            require_token(&args.token)?;
            let option = FolderOption::parse(&option, &value)?;
            client.set_folder_option(&folder, &option).await?;
            tracing::info!("Set {} on folder {}", option.name(), folder);
            Ok(())
        }
        Command::Ls { content_id } => {
            require_token(&args.token)?;
            print_json(&client.get_content(&content_id).await?)
        }
        Command::Upload {
            file,
            folder,
            server,
            memory,
            tmp_dir,
        } => {
            let folder = match folder {
                Some(folder) => folder,
                None if args.token.is_empty() => String::new(),
                None => client
                    .get_account_details()
                    .await
                    .context("failed to look up root folder")?
                    .root_folder,
            };
            let server = match server {
                Some(server) => server,
                None => client.get_server().await.context("failed to find an upload server")?,
            };
            let strategy = staging_strategy(memory, tmp_dir);

            tracing::info!("Uploading {} to {}", file.display(), server);
            let upload = client
                .upload_path(&server, &folder, &file, &strategy, Some(progress_logger()))
                .await
                .with_context(|| format!("failed to upload {}", file.display()))?;
            print_json(&upload)
        }
    }
}

fn require_token(token: &str) -> anyhow::Result<()> {
    if token.is_empty() {
        bail!("this command needs an account token (--token or GOFILE_TOKEN)");
    }
    Ok(())
}

fn staging_strategy(memory: bool, tmp_dir: Option<std::path::PathBuf>) -> StagingStrategy {
    if memory {
        StagingStrategy::Memory
    } else {
        StagingStrategy::TempFile { dir: tmp_dir }
    }
}

/// Log progress at most once per 10% step
fn progress_logger() -> ProgressCallback {
    let last_step = AtomicU64::new(0);
    progress_callback(move |total, sent| {
        let progress = UploadProgress::new(total, sent);
        let step = (progress.percentage() / 10.0) as u64;
        if step > last_step.swap(step, Ordering::Relaxed) || progress.is_complete() {
            tracing::info!("{:>5.1}% ({}/{} bytes)", progress.percentage(), sent, total);
        }
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
