//! Lunark CLI - Command-line tool for ark archive extraction.
//!
//! This is the main entry point for the Lunark command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use lunark::prelude::*;

/// Lunark - ark game archive extraction tool
#[derive(Parser)]
#[command(name = "lunark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract files from one or more ark archives
    Extract {
        /// Ark files or glob patterns
        #[arg(required = true)]
        archives: Vec<String>,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: Option<PathBuf>,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Extract each archive into its own folder
        #[arg(short = 's', long)]
        separate_folders: bool,

        /// Keep going when an entry fails to extract
        #[arg(short, long)]
        ignore_errors: bool,

        /// Skip MD5 verification
        #[arg(long)]
        no_verify: bool,
    },

    /// List contents of an ark archive
    List {
        /// Path to the ark file
        #[arg(short, long, env = "INPUT_ARK")]
        archive: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show header information of an ark archive
    Info {
        /// Path to the ark file
        #[arg(short, long, env = "INPUT_ARK")]
        archive: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            archives,
            output,
            filter,
            separate_folders,
            ignore_errors,
            no_verify,
        } => {
            let options = ReadOptions {
                verify_checksums: !no_verify,
                ..ReadOptions::default()
            };
            cmd_extract(
                &archives,
                output,
                filter.as_deref(),
                separate_folders,
                ignore_errors,
                options,
            )?;
        }
        Commands::List {
            archive,
            filter,
            detailed,
        } => {
            cmd_list(&archive, filter.as_deref(), detailed)?;
        }
        Commands::Info { archive } => {
            cmd_info(&archive)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_extract(
    patterns: &[String],
    output: Option<PathBuf>,
    filter: Option<&str>,
    separate_folders: bool,
    ignore_errors: bool,
    options: ReadOptions,
) -> Result<()> {
    let files = expand_patterns(patterns)?;
    if files.is_empty() {
        anyhow::bail!("no ark files matched {:?}", patterns);
    }
    let filter = filter.map(compile_filter).transpose()?;

    // A single archive without -o extracts into a folder named after it.
    let output = match output {
        Some(output) => output,
        None if files.len() == 1 => PathBuf::from(file_stem(&files[0])),
        None => PathBuf::from("."),
    };

    let mut failures: Vec<(PathBuf, Vec<String>)> = Vec::new();
    for path in &files {
        let target = if separate_folders && files.len() > 1 {
            output.join(file_stem(path))
        } else {
            output.clone()
        };

        let failed = extract_archive(path, &target, filter.as_ref(), ignore_errors, options)?;
        if !failed.is_empty() {
            failures.push((path.clone(), failed));
        }
    }

    for (archive, names) in &failures {
        tracing::warn!(
            archive = %archive.display(),
            count = names.len(),
            "skipped entries: {}",
            names.join(", ")
        );
    }

    Ok(())
}

fn extract_archive(
    path: &Path,
    output: &Path,
    filter: Option<&glob::Pattern>,
    ignore_errors: bool,
    options: ReadOptions,
) -> Result<Vec<String>> {
    println!("Opening ark archive: {}", path.display());

    let start = Instant::now();
    let archive = ArkArchive::open_with_options(path, options)
        .with_context(|| format!("Failed to open ark archive {}", path.display()))?;

    println!(
        "Loaded {} entries ({}) in {:?}",
        archive.entry_count(),
        archive.version(),
        start.elapsed()
    );

    let matches = |entry: &ArkEntry| filter.map_or(true, |p| p.matches(entry.name()));
    let total = archive.iter().filter(|e| matches(*e)).count();

    println!("Extracting {} entries...", total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut failed = Vec::new();
    for (entry, result) in archive.extract_all(matches) {
        match result {
            Ok(data) => {
                let output_path = output.join(entry.output_path());
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output_path, data)
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
            }
            // Already logged by extract_all.
            Err(_) if ignore_errors => failed.push(entry.name().to_string()),
            Err(e) => {
                pb.abandon();
                return Err(e).with_context(|| format!("Failed to extract {}", entry.name()));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());

    Ok(failed)
}

fn cmd_list(path: &Path, filter: Option<&str>, detailed: bool) -> Result<()> {
    let archive = ArkArchive::open(path).context("Failed to open ark archive")?;
    let filter = filter.map(compile_filter).transpose()?;

    let mut count = 0;
    for entry in archive.iter() {
        if let Some(pattern) = &filter {
            if !pattern.matches(entry.name()) {
                continue;
            }
        }

        if detailed {
            println!(
                "{:>12} {:>12} {}{} {}",
                entry.stored_size(),
                entry.uncompressed_size(),
                if entry.is_encrypted() { "E" } else { " " },
                if entry.is_stored() { "S" } else { " " },
                entry.name()
            );
        } else {
            println!("{}", entry.name());
        }
        count += 1;
    }

    println!("\nTotal: {} entries", count);

    Ok(())
}

fn cmd_info(path: &Path) -> Result<()> {
    let archive = ArkArchive::open(path).context("Failed to open ark archive")?;
    let header = archive.header();

    println!("Archive:         {}", archive.name());
    println!("Size:            {} bytes", archive.source_len());
    println!("Version:         {}", header.version);
    println!("Entries:         {}", header.file_count);
    println!("Table offset:    {}", header.metadata_offset);
    println!("Data offset:     {}", header.data_offset());
    println!("Duplicate names: {}", archive.duplicate_count());

    let encrypted = archive.iter().filter(|e| e.is_encrypted()).count();
    let stored = archive.iter().filter(|e| e.is_stored()).count();
    println!("Encrypted:       {}", encrypted);
    println!("Stored:          {}", stored);

    Ok(())
}

fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for path in glob::glob(pattern).with_context(|| format!("Invalid pattern {pattern}"))? {
            files.push(path?);
            matched = true;
        }
        // Literal paths with glob metacharacters still work.
        if !matched && Path::new(pattern).is_file() {
            files.push(PathBuf::from(pattern));
        }
    }
    Ok(files)
}

fn compile_filter(pattern: &str) -> Result<glob::Pattern> {
    glob::Pattern::new(pattern).with_context(|| format!("Invalid filter {pattern}"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("archive")
        .to_string()
}
