//! noisepdf CLI - PDF text-layer obfuscation tool

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use noisepdf::{
    ExtractOptions, GlyphExtractor, ObfuscateOptions, ObfuscationReport, Obfuscator, PageSize,
    PageSizePolicy, RenderOptions, StagedUpload, StandardFont,
};

#[derive(Parser)]
#[command(name = "noisepdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Re-render PDF documents with a noised text layer", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Input PDF file ("-" for stdin)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    obfuscate: ObfuscateArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Obfuscate a PDF (default command)
    Obfuscate {
        /// Input PDF file ("-" for stdin)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        args: ObfuscateArgs,
    },

    /// Show the extracted lines and glyph positions
    Inspect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,

        /// Continue past pages whose content cannot be read
        #[arg(long)]
        lenient: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct ObfuscateArgs {
    /// Output file (default: obfuscated_<FILE>)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Probability of inserting a noise character after each character
    #[arg(short, long, default_value = "0.01", env = "NOISEPDF_LEVEL")]
    noise_level: f64,

    /// Seed for reproducible output
    #[arg(long, env = "NOISEPDF_SEED")]
    seed: Option<u64>,

    /// Output page size
    #[arg(long, value_enum, default_value = "letter")]
    page_size: PageSizeArg,

    /// Font for text whose original font is unknown (e.g., "Times-Roman")
    #[arg(long, default_value = "Helvetica")]
    font: String,

    /// Font size used when the original size is unusable
    #[arg(long, default_value = "12")]
    font_size: f32,

    /// Skip characters the Latin fonts cannot encode instead of using a CJK font
    #[arg(long)]
    no_unicode_fallback: bool,

    /// Write uncompressed content streams
    #[arg(long)]
    no_compress: bool,

    /// Continue past pages whose content cannot be read
    #[arg(long)]
    lenient: bool,

    /// Print the run report as JSON
    #[arg(long)]
    report: bool,

    /// Upload name when reading from stdin
    #[arg(long, value_name = "NAME", default_value = "stdin.pdf")]
    name: String,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PageSizeArg {
    /// US Letter (612 x 792 pt)
    Letter,
    /// ISO A4 (595 x 842 pt)
    A4,
    /// Same size as the input page
    Match,
}

impl From<PageSizeArg> for PageSizePolicy {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::Letter => PageSizePolicy::Fixed(PageSize::LETTER),
            PageSizeArg::A4 => PageSizePolicy::Fixed(PageSize::A4),
            PageSizeArg::Match => PageSizePolicy::MatchInput,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Obfuscate { input, args }) => cmd_obfuscate(&input, &args),
        Some(Commands::Inspect {
            input,
            json,
            lenient,
        }) => cmd_inspect(&input, json, lenient),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: obfuscate if input is provided
            if let Some(input) = cli.input {
                cmd_obfuscate(&input, &cli.obfuscate)
            } else {
                println!("{}", "Usage: noisepdf <FILE> [-o OUTPUT]".yellow());
                println!("       noisepdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_options(args: &ObfuscateArgs) -> Result<ObfuscateOptions, Box<dyn std::error::Error>> {
    let font = StandardFont::from_name(&args.font).ok_or_else(|| {
        let known: Vec<&str> = StandardFont::ALL.iter().map(|f| f.base_font()).collect();
        format!("Unknown font {}; expected one of: {}", args.font, known.join(", "))
    })?;

    let render = RenderOptions::new()
        .with_page_size(args.page_size.into())
        .with_default_font(font)
        .with_default_font_size(args.font_size)
        .with_unicode_fallback(!args.no_unicode_fallback)
        .with_compression(!args.no_compress);

    let mut extract = ExtractOptions::new();
    if args.lenient {
        extract = extract.lenient();
    }

    let mut options = ObfuscateOptions::new()
        .with_noise_level(args.noise_level)
        .with_extract_options(extract)
        .with_render_options(render);
    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }
    Ok(options)
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn cmd_obfuscate(input: &Path, args: &ObfuscateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let obfuscator = Obfuscator::new(build_options(args)?)?;

    let pb = spinner("Obfuscating PDF...")?;
    let outcome = obfuscate_input(&obfuscator, input, args);
    pb.finish_and_clear();
    let (output, bytes, report) = outcome?;

    log::debug!("Writing {} bytes to {}", bytes.len(), output.display());
    fs::write(&output, &bytes)?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
        println!("{} {}", "Saved to".green(), output.display());
    }

    Ok(())
}

/// Run the pipeline on a path or on stdin ("-"), returning where to save.
fn obfuscate_input(
    obfuscator: &Obfuscator,
    input: &Path,
    args: &ObfuscateArgs,
) -> Result<(PathBuf, Vec<u8>, ObfuscationReport), Box<dyn std::error::Error>> {
    if input == Path::new("-") {
        let upload = StagedUpload::receive(std::env::temp_dir(), &args.name, io::stdin().lock())?;
        let download = upload.process(obfuscator)?;
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&download.file_name));
        return Ok((output, download.bytes, download.report));
    }

    let mut bytes = Vec::new();
    let report = obfuscator.obfuscate_file(input, &mut bytes)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(input));
    Ok((output, bytes, report))
}

fn default_output(input: &Path) -> PathBuf {
    let name = input.file_name().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("obfuscated_{}", name))
}

fn print_summary(report: &ObfuscationReport) {
    println!("{}", "Obfuscation Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages".bold(), report.pages);
    println!("{}: {}", "Lines".bold(), report.lines);
    println!(
        "{}: {} of {}",
        "Glyphs drawn".bold(),
        report.glyphs_drawn,
        report.glyphs_extracted
    );
    println!("{}: {}", "Noise inserted".bold(), report.noise_inserted);
    println!("{}: {}", "Noise dropped".bold(), report.noise_dropped);
    if report.fallback_font_uses > 0 {
        println!("{}: {}", "Default font uses".bold(), report.fallback_font_uses);
    }
    if !report.failures.is_empty() {
        println!(
            "{}: {}",
            "Skipped glyphs".yellow().bold(),
            report.failures.len()
        );
    }
    println!();
}

fn cmd_inspect(input: &Path, json: bool, lenient: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new();
    if lenient {
        options = options.lenient();
    }
    let extractor = GlyphExtractor::open_with_options(input, options)?;
    let pages = extractor.extract_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), extractor.version());
    println!("{}: {}", "Pages".bold(), extractor.page_count());

    for page in &pages {
        println!();
        println!(
            "{} {} ({} x {} pt)",
            "Page".cyan().bold(),
            page.number,
            page.width,
            page.height
        );
        println!("{}", "─".repeat(40).dimmed());
        for line in &page.lines {
            let Some(first) = line.glyphs.first() else {
                continue;
            };
            println!(
                "{} {}",
                format!(
                    "[{:>7.2}, {:>7.2}] {:>5.1}pt {}",
                    first.x, first.y, first.font_size, first.font_name
                )
                .dimmed(),
                line.text()
            );
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "noisepdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF text-layer obfuscation tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_args() -> ObfuscateArgs {
        Cli::parse_from(["noisepdf", "in.pdf"]).obfuscate
    }

    #[test]
    fn test_missing_input_returns_error() {
        let args = default_args();
        let obfuscator = Obfuscator::new(build_options(&args).unwrap()).unwrap();
        let result = obfuscate_input(&obfuscator, Path::new("/no/such/input.pdf"), &args);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_output_is_prefixed() {
        assert_eq!(
            default_output(Path::new("docs/report.pdf")),
            PathBuf::from("docs/obfuscated_report.pdf")
        );
    }

    #[test]
    fn test_unknown_font_is_rejected() {
        let mut args = default_args();
        args.font = "Comic Sans".to_string();
        assert!(build_options(&args).is_err());
    }
}
