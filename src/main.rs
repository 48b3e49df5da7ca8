//! Beanform main entry point

use beanform_api::start_server;
use beanform_config::Config;
use beanform_core::{
    FileReferenceProvider, FormSession, LedgerAppendSink, NewEntrySource, ReferenceCell,
    ResetOnSubmit,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "beanform")]
#[command(author = "Beanform Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight web form for drafting plain-text ledger transactions", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let rt = Runtime::new()?;

    rt.block_on(async {
        let config = Config::load(args.config.clone())
            .expect("Failed to load configuration");

        eprintln!("[INFO] Config loaded: data path={}, ledger_file={}",
            config.data.path.to_string_lossy(), config.data.ledger_file);

        let provider = Arc::new(FileReferenceProvider::new(config.data.reference_path()));
        let reference = Arc::new(ReferenceCell::new(provider));

        // Try to load reference data if the file exists
        let reference_path = config.data.reference_path();
        eprintln!("[INFO] Looking for reference file: {}", reference_path.to_string_lossy());

        if reference_path.exists() {
            eprintln!("[INFO] Reference file found, loading...");
            reference.refresh().await;
        } else {
            eprintln!("[WARN] Reference file not found: {}", reference_path.display());
        }

        let sink = Arc::new(LedgerAppendSink::new(config.data.ledger_path()));
        let strategy = Box::new(ResetOnSubmit::new(config.form.payload));
        let session = Arc::new(RwLock::new(FormSession::new(
            Box::new(NewEntrySource),
            strategy,
            sink,
        )));

        start_server(config, session, reference).await
    });

    Ok(())
}
