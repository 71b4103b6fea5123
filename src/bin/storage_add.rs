//! storage-add CLI
//!
//! Adds local files to a storage service through its HTTP API and prints
//! the identifiers the service assigned.

use clap::{Arg, ArgAction, Command};
use std::io::Write;
use std::time::Duration;
use storage_http_client::{
    put_all, CancellationToken, CidVersion, ClientConfig, FileInput, StorageClient, UploadOptions,
};

fn cli() -> Command {
    Command::new("storage-add")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Add files to a content-addressed storage service")
        .arg(
            Arg::new("api")
                .long("api")
                .help("API base URL (default: $STORAGE_API_URL or http://127.0.0.1:5001/api/v0/)"),
        )
        .arg(
            Arg::new("pin")
                .long("pin")
                .help("Pin the added content")
                .value_parser(clap::value_parser!(bool)),
        )
        .arg(
            Arg::new("cid-version")
                .long("cid-version")
                .help("CID version to produce (0 or 1)")
                .value_parser(clap::value_parser!(u64).range(0..=1)),
        )
        .arg(
            Arg::new("chunker")
                .long("chunker")
                .help("Chunking algorithm, e.g. size-262144"),
        )
        .arg(
            Arg::new("hash")
                .long("hash")
                .help("Hash algorithm, e.g. sha2-256"),
        )
        .arg(
            Arg::new("raw-leaves")
                .long("raw-leaves")
                .help("Use raw blocks for leaf nodes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("trickle")
                .long("trickle")
                .help("Use the trickle DAG layout")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("wrap-with-directory")
                .short('w')
                .long("wrap-with-directory")
                .help("Wrap the files in a directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("only-hash")
                .short('n')
                .long("only-hash")
                .help("Only compute identifiers, do not store content")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("progress")
                .short('p')
                .long("progress")
                .help("Report upload progress on stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON object per added file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("files")
                .help("Files to add")
                .required(true)
                .num_args(1..),
        )
}

fn upload_options(matches: &clap::ArgMatches) -> Result<UploadOptions, Box<dyn std::error::Error>> {
    let mut options = UploadOptions::new();

    if let Some(pin) = matches.get_one::<bool>("pin") {
        options = options.pin(*pin);
    }
    if let Some(version) = matches.get_one::<u64>("cid-version") {
        options = options.cid_version(CidVersion::try_from(*version)?);
    }
    if let Some(chunker) = matches.get_one::<String>("chunker") {
        options = options.chunker(chunker.clone());
    }
    if let Some(hash) = matches.get_one::<String>("hash") {
        options = options.hash_alg(hash.clone());
    }
    if matches.get_flag("raw-leaves") {
        options = options.raw_leaves(true);
    }
    if matches.get_flag("trickle") {
        options = options.trickle(true);
    }
    if matches.get_flag("wrap-with-directory") {
        options = options.wrap_with_directory(true);
    }
    if matches.get_flag("only-hash") {
        options = options.only_hash(true);
    }
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        options = options.timeout(Duration::from_secs(*secs));
    }
    if matches.get_flag("progress") {
        options = options.on_progress(|progress| {
            eprint!(
                "\rUploaded {} ({:.0}%)",
                progress.uploaded_string(),
                progress.percentage * 100.0
            );
            let _ = std::io::stderr().flush();
        });
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let matches = cli().get_matches();

    let mut config = ClientConfig::from_env()?;
    if let Some(api) = matches.get_one::<String>("api") {
        config = config.base_url(api.clone());
    }
    let client = StorageClient::new(config)?;

    let token = CancellationToken::new();
    let options = upload_options(&matches)?.cancellation(token.clone());

    let mut files = Vec::new();
    for path in matches.get_many::<String>("files").into_iter().flatten() {
        files.push(FileInput::from_path(path).await?);
    }

    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let added = put_all(&client, &files, &options).await?;
    if matches.get_flag("progress") {
        eprintln!();
    }

    for file in added {
        if matches.get_flag("json") {
            let record = serde_json::json!({
                "cid": file.cid.to_string(),
                "path": file.path,
                "size": file.size,
            });
            println!("{}", record);
        } else {
            println!("added {} {} ({})", file.cid, file.path, file.size_string());
        }
    }

    Ok(())
}
