use clap::{Args, Parser, Subcommand};
use srcset_gen::config::{self, JobConfig, ProcessingConfig, SrcsetConfig};
use srcset_gen::filter::PathFilter;
use srcset_gen::imaging::{OutputFormat, OutputSettings, Quality};
use srcset_gen::ladder::RequestedWidths;
use srcset_gen::output;
use srcset_gen::process::{self, BatchOptions, BatchReport, ProcessError};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "srcset-gen")]
#[command(about = "Generate responsive image width ladders")]
#[command(long_about = "\
Generate responsive image width ladders

Every .jpg/.jpeg/.png/.heic file under a directory gets sibling variants
named <stem>_<width>_w.<ext>, one per target width. Widths wider than the
source are replaced by the source width rounded down to a multiple of 100,
and nothing wider is produced.

  images/portfolio/
  ├── dawn.jpg            # 1000px wide source
  ├── dawn_400_w.avif
  ├── dawn_800_w.avif
  └── dawn_1000_w.avif    # 1500 requested, capped

Existing variants are never re-encoded: delete a file to regenerate it.
Run 'srcset-gen gen-config' to generate a documented srcset.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate variants for every image under one directory
    Convert(ConvertArgs),
    /// Run every [[jobs]] entry of the config file
    Run(RunArgs),
    /// Print a stock srcset.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct ConvertArgs {
    /// Directory to scan recursively
    root: PathBuf,

    /// Target widths, comma separated (default: images.widths from config)
    #[arg(long, value_delimiter = ',')]
    widths: Option<Vec<u32>>,

    /// Only process paths containing this substring (repeatable)
    #[arg(long)]
    include: Vec<String>,

    /// Skip paths containing this substring (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Output format: avif (lossy) or webp (always lossless, ignores --quality)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Encoding quality, 1-100
    #[arg(long)]
    quality: Option<u32>,

    #[command(flatten)]
    common: RunArgs,
}

/// Flags shared by commands that run batches.
#[derive(Args, Clone)]
struct RunArgs {
    /// Max parallel workers (default: processing.max_processes, else all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Write the batch report as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => {
            let site = config::load_config(&cli.config)?;
            let job = JobConfig {
                root: args.root,
                widths: args.widths,
                include: args.include,
                exclude: args.exclude,
            };
            let mut settings = site.output_settings();
            if let Some(format) = args.format {
                settings.format = format;
            }
            if let Some(quality) = args.quality {
                settings.quality = Quality::new(quality);
            }
            let widths = site.widths_for(&job)?;
            let processing = processing_for(&site, &args.common);
            run_job(&job, &widths, settings, processing, args.common.report.as_deref())?;
        }
        Command::Run(args) => {
            let site = config::load_config(&cli.config)?;
            if site.jobs.is_empty() {
                println!("No [[jobs]] in {}", cli.config.display());
            }
            let processing = processing_for(&site, &args);
            for (i, job) in site.jobs.iter().enumerate() {
                let widths = site.widths_for(job)?;
                let report_path = args.report.as_ref().map(|p| numbered_report_path(p, i));
                run_job(
                    job,
                    &widths,
                    site.output_settings(),
                    processing.clone(),
                    report_path.as_deref(),
                )?;
            }
            println!("Done.");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn processing_for(site: &SrcsetConfig, args: &RunArgs) -> ProcessingConfig {
    ProcessingConfig {
        max_processes: args.threads.or(site.processing.max_processes),
    }
}

/// Run one batch, streaming progress lines from a printer thread.
fn run_job(
    job: &JobConfig,
    widths: &RequestedWidths,
    settings: OutputSettings,
    processing: ProcessingConfig,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = BatchOptions {
        filter: PathFilter::new(job.include.clone(), job.exclude.clone()),
        output: settings,
        processing,
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::run(&job.root, widths, &options, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    let report = match &result {
        Ok(report) => Some(report),
        Err(ProcessError::Batch(batch)) => Some(&batch.report),
        Err(_) => None,
    };
    if let Some(report) = report {
        output::print_batch_summary(report);
        if let Some(path) = report_path {
            write_report(report, path)?;
        }
    }

    result?;
    Ok(())
}

fn write_report(report: &BatchReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// `report.json` → `report.1.json` for the second job, and so on.
fn numbered_report_path(path: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{index}"),
    };
    path.with_file_name(name)
}
