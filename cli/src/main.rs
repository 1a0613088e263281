//! manudoc CLI - manuscript markup to DOCX converter

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use manudoc::{FigureMode, Manudoc, PageSize, ParseOptions, RenderOptions};

#[derive(Parser)]
#[command(name = "manudoc")]
#[command(version)]
#[command(about = "Render manuscript markdown to submission-ready DOCX", long_about = None)]
struct Cli {
    /// Input markup file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output DOCX file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a manuscript to DOCX
    Convert {
        /// Input markup file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input name with .docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Build a submission package: main text, figures and tables documents
    Package {
        /// Input markup file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the parsed document structure as JSON
    Inspect {
        /// Input markup file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Convert a manuscript to plain text
    Text {
        /// Input markup file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show version information
    Version,
}

/// How the markup is assembled.
#[derive(Args, Clone, Default)]
struct LayoutArgs {
    /// Collect tables into a trailing "Tables" section
    #[arg(long)]
    defer_tables: bool,

    /// Directory relative image paths are resolved against
    #[arg(long, value_name = "DIR", env = "MANUDOC_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Fallback directory searched for images by file name (repeatable)
    #[arg(
        long = "search-path",
        value_name = "DIR",
        env = "MANUDOC_SEARCH_PATH",
        value_delimiter = ','
    )]
    search_paths: Vec<PathBuf>,

    /// How image references are rendered
    #[arg(long, value_enum)]
    figures: Option<FigureArg>,

    /// Image width in inches
    #[arg(long, value_name = "INCHES")]
    image_width: Option<f32>,

    /// Caption font size in points
    #[arg(long, value_name = "PT")]
    caption_size: Option<f32>,

    /// Heading level that starts a new page (0 disables)
    #[arg(long, value_name = "LEVEL")]
    page_break_level: Option<u8>,

    /// Treat "- " and "1. " lines as ordinary paragraphs
    #[arg(long)]
    no_lists: bool,

    /// Keep blank source lines as empty paragraphs
    #[arg(long)]
    blank_lines: bool,

    /// Rewrite R-squared, beta_0 and similar to symbols
    #[arg(long)]
    normalize_symbols: bool,

    /// Drop author, email and phone lines for peer review
    #[arg(long)]
    blinded: bool,

    /// Title of the deferred tables section
    #[arg(long, value_name = "TITLE")]
    tables_heading: Option<String>,
}

impl LayoutArgs {
    fn to_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_deferred_tables(self.defer_tables)
            .with_search_paths(self.search_paths.iter().cloned())
            .with_lists(!self.no_lists)
            .with_blank_line_spacing(self.blank_lines)
            .with_symbol_normalization(self.normalize_symbols)
            .with_blinding(self.blinded);
        if let Some(heading) = &self.tables_heading {
            options = options.with_tables_heading(heading);
        }
        if let Some(dir) = &self.base_dir {
            options = options.with_base_dir(dir);
        }
        if let Some(mode) = self.figures {
            options = options.with_figure_mode(mode.into());
        }
        if let Some(width) = self.image_width {
            options = options.with_image_width(width);
        }
        if let Some(size) = self.caption_size {
            options = options.with_caption_font_size(size);
        }
        if let Some(level) = self.page_break_level {
            options = options.with_page_break_level((level > 0).then_some(level));
        }
        options
    }
}

/// How the DOCX is styled.
#[derive(Args, Clone, Default)]
struct StyleArgs {
    /// Font family
    #[arg(long, value_name = "NAME")]
    font: Option<String>,

    /// Body font size in points
    #[arg(long, value_name = "PT")]
    font_size: Option<f32>,

    /// Line spacing multiplier
    #[arg(long, value_name = "N")]
    line_spacing: Option<f32>,

    /// Page size
    #[arg(long, value_enum)]
    page: Option<PageArg>,
}

impl StyleArgs {
    fn to_options(&self) -> RenderOptions {
        let mut options = RenderOptions::new();
        if let Some(font) = &self.font {
            options = options.with_font(font);
        }
        if let Some(size) = self.font_size {
            options = options.with_font_size(size);
        }
        if let Some(spacing) = self.line_spacing {
            options = options.with_line_spacing(spacing);
        }
        if let Some(page) = self.page {
            options = options.with_page_size(page.into());
        }
        options
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FigureArg {
    /// Embed images in the text
    Inline,
    /// Insert "[INSERT FIGURE HERE]" markers
    Placeholder,
    /// Leave images out
    Omit,
}

impl From<FigureArg> for FigureMode {
    fn from(arg: FigureArg) -> Self {
        match arg {
            FigureArg::Inline => FigureMode::Inline,
            FigureArg::Placeholder => FigureMode::Placeholder,
            FigureArg::Omit => FigureMode::Omit,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PageArg {
    /// 210 x 297 mm
    A4,
    /// 8.5 x 11 in
    Letter,
}

impl From<PageArg> for PageSize {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::A4 => PageSize::A4,
            PageArg::Letter => PageSize::Letter,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            layout,
            style,
        }) => cmd_convert(&input, output.as_deref(), &layout, &style),
        Some(Commands::Package {
            input,
            output,
            layout,
            style,
        }) => cmd_package(&input, output.as_deref(), &layout, &style),
        Some(Commands::Inspect {
            input,
            output,
            compact,
            layout,
        }) => cmd_inspect(&input, output.as_deref(), compact, &layout),
        Some(Commands::Text {
            input,
            output,
            layout,
        }) => cmd_text(&input, output.as_deref(), &layout),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    cli.output.as_deref(),
                    &LayoutArgs::default(),
                    &StyleArgs::default(),
                )
            } else {
                println!("{}", "Usage: manudoc <FILE> [OUTPUT]".yellow());
                println!("       manudoc --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    layout: &LayoutArgs,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("docx"));

    let result = Manudoc::new()
        .with_parse_options(layout.to_options())
        .with_render_options(style.to_options())
        .parse(input)?;
    result.write_docx(&output)?;

    report_missing(&result.stats().missing_images);
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_package(
    input: &Path,
    output: Option<&Path>,
    layout: &LayoutArgs,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}_submission", stem)));

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(5);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    // The main text of a submission is blinded and keeps figures and tables out of line.
    pb.set_message("Parsing manuscript...");
    let mut options = layout.to_options().defer_tables();
    if layout.figures.is_none() {
        options = options.with_figure_mode(FigureMode::Placeholder);
    }
    let front_matter = Manudoc::new()
        .with_parse_options(options.clone().with_blinding(false))
        .with_render_options(style.to_options())
        .parse(input)?;
    let result = Manudoc::new()
        .with_parse_options(options.with_blinding(true))
        .with_render_options(style.to_options())
        .parse(input)?;
    pb.inc(1);

    let title_name = format!("{}_TitlePage.docx", stem);
    let main_name = format!("{}_Main.docx", stem);
    let figures_name = format!("{}_Figures.docx", stem);
    let tables_name = format!("{}_Tables.docx", stem);

    pb.set_message("Writing title page...");
    front_matter.write_title_page_docx(output_dir.join(&title_name))?;
    pb.inc(1);

    pb.set_message("Writing main text...");
    result.write_docx(output_dir.join(&main_name))?;
    pb.inc(1);

    pb.set_message("Writing figures...");
    result.write_figures_docx(output_dir.join(&figures_name))?;
    pb.inc(1);

    pb.set_message("Writing tables...");
    result.write_tables_docx(output_dir.join(&tables_name))?;
    pb.inc(1);

    pb.finish_with_message("Done!");
    log::debug!("Package written to {}", output_dir.display());

    let stats = result.stats();
    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), title_name);
    println!("  {} {} (blinded)", "├─".dimmed(), main_name);
    println!(
        "  {} {} ({} figures)",
        "├─".dimmed(),
        figures_name,
        result.figures().len()
    );
    println!("  {} {} ({} tables)", "└─".dimmed(), tables_name, stats.tables);
    report_missing(&stats.missing_images);

    Ok(())
}

fn cmd_inspect(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    layout: &LayoutArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = Manudoc::new()
        .with_parse_options(layout.to_options())
        .parse(input)?;

    let value = serde_json::json!({
        "document": result.document(),
        "stats": result.stats(),
        "figures": result.figures(),
    });
    let json = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    layout: &LayoutArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = Manudoc::new()
        .with_parse_options(layout.to_options())
        .parse(input)?;
    let text = result.to_text();

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn report_missing(missing: &[String]) {
    if missing.is_empty() {
        return;
    }
    eprintln!(
        "{} {} image(s) not found:",
        "Warning:".yellow().bold(),
        missing.len()
    );
    for path in missing {
        eprintln!("  {} {}", "-".dimmed(), path);
    }
}

fn cmd_version() {
    println!("{} {}", "manudoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Manuscript markup to DOCX converter");
}
