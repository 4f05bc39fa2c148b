//! catsdogs CLI - classify images as cat or dog.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catsdogs::image::load_image;
use catsdogs::Classifier;

/// Classify images with a pre-trained cat vs. dog ONNX model.
#[derive(Parser, Debug)]
#[command(name = "catsdogs")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image files to classify.
    #[arg(value_name = "IMAGE", required = true)]
    images: Vec<PathBuf>,

    /// Path to the ONNX model file.
    #[arg(short, long, default_value = "cats_vs_dogs.onnx", value_name = "FILE")]
    model: PathBuf,

    /// Class labels, in model output order.
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "Cat,Dog",
        value_name = "LIST"
    )]
    labels: Vec<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("catsdogs={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let labels: Vec<&str> = args.labels.iter().map(String::as_str).collect();

    // One classifier for the whole run; if the model cannot be loaded,
    // classification is unavailable and we stop here.
    let mut classifier = Classifier::from_file(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;

    for path in &args.images {
        if !path.exists() {
            eprintln!("{}: no such file", path.display());
            continue;
        }

        // A failure on one image is reported inline; the rest still run.
        match classify_one(&mut classifier, path, &labels) {
            Ok(label) => println!("{}: {label}", path.display()),
            Err(err) => eprintln!("{}: {err:#}", path.display()),
        }
    }

    Ok(())
}

fn classify_one(classifier: &mut Classifier, path: &Path, labels: &[&str]) -> Result<String> {
    let img = load_image(path).context("Failed to read image")?;

    classifier
        .classify_image(&img, labels)
        .context("Failed to classify image")
}
