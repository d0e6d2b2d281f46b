//! Upload a file to the account root folder
//!
//! Run with: GOFILE_TOKEN=... cargo run --example upload -- <file>

use gofile_client::{progress_callback, Config, GofileClient, StagingStrategy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).ok_or("usage: upload <file>")?;
    let token = std::env::var("GOFILE_TOKEN")?;

    let client = GofileClient::new(Config::default().with_token(token))?;

    let account = client.get_account_details().await?;
    println!("Account: {} ({} tier)", account.email, account.tier);
    println!(
        "Storage: {} of {} bytes",
        account.total_size, account.total_size_limit
    );

    let server = client.get_server().await?;
    println!("Uploading to {}", server);

    let upload = client
        .upload_path(
            &server,
            &account.root_folder,
            &path,
            &StagingStrategy::temp_file(),
            Some(progress_callback(|total, sent| {
                println!("  {}/{} bytes", sent, total);
            })),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&upload)?);
    Ok(())
}
