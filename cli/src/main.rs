//! pagemark CLI - paginated document tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use pagemark::style::{MEASURE_SELECTOR, PREVIEW_SELECTOR, PRINT_SELECTOR};
use pagemark::{
    project_stylesheet, resolve_scale, PageFormat, Pagemark, ScaleConstraints, ThemeTokens,
};

#[derive(Parser)]
#[command(name = "pagemark")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Paginate markdown documents into print-ready pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document and print its pages as JSON
    Paginate {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Render a document to standalone print-ready HTML
    Export {
        /// Input markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input name with an .html extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the stylesheet projected for one surface
    Css {
        /// Surface to project for
        #[arg(long, default_value = "preview", value_parser = ["preview", "measure", "print"])]
        surface: String,

        /// Custom selector (overrides --surface)
        #[arg(long)]
        selector: Option<String>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Resolve the display scale of a page inside a container
    Scale {
        /// Container width in pixels
        #[arg(long)]
        width: f32,

        /// Container height in pixels
        #[arg(long)]
        height: Option<f32>,

        /// Page format
        #[arg(short, long, default_value = "A4", env = "PAGEMARK_FORMAT")]
        format: PageFormat,

        /// Use thumbnail constraints (fit both axes, min 0.2)
        #[arg(long)]
        thumbnail: bool,
    },

    /// Show page format geometry
    Info {
        /// Page format (all formats if not specified)
        #[arg(short, long)]
        format: Option<PageFormat>,

        /// Theme JSON file used for the usable area
        #[arg(long, value_name = "FILE")]
        theme: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Page format, theme and author CSS shared by the rendering commands.
#[derive(Args)]
struct StyleArgs {
    /// Page format
    #[arg(short, long, default_value = "A4", env = "PAGEMARK_FORMAT")]
    format: PageFormat,

    /// Theme JSON file
    #[arg(long, value_name = "FILE")]
    theme: Option<PathBuf>,

    /// Author CSS file
    #[arg(long, value_name = "FILE")]
    css: Option<PathBuf>,

    /// Override base font size (px)
    #[arg(long)]
    font_size: Option<f32>,

    /// Override line height multiplier
    #[arg(long)]
    line_height: Option<f32>,

    /// Override page padding (px)
    #[arg(long)]
    page_padding: Option<f32>,

    /// Override paragraph spacing (rem)
    #[arg(long)]
    paragraph_spacing: Option<f32>,

    /// Override text color
    #[arg(long)]
    color: Option<String>,
}

impl StyleArgs {
    fn theme(&self) -> Result<ThemeTokens, Box<dyn std::error::Error>> {
        let mut theme = load_theme(self.theme.as_deref())?;
        if let Some(size) = self.font_size {
            theme = theme.with_font_size(size);
        }
        if let Some(height) = self.line_height {
            theme = theme.with_line_height(height);
        }
        if let Some(padding) = self.page_padding {
            theme = theme.with_page_padding(padding);
        }
        if let Some(spacing) = self.paragraph_spacing {
            theme = theme.with_paragraph_spacing(spacing);
        }
        if let Some(ref color) = self.color {
            theme = theme.with_color(color.clone());
        }
        theme.validate()?;
        Ok(theme)
    }

    fn author_css(&self) -> Result<String, Box<dyn std::error::Error>> {
        match self.css {
            Some(ref path) => Ok(fs::read_to_string(path)?),
            None => Ok(String::new()),
        }
    }

    fn builder(&self) -> Result<Pagemark, Box<dyn std::error::Error>> {
        Ok(Pagemark::new()
            .with_format(self.format)
            .with_theme(self.theme()?)
            .with_author_css(self.author_css()?))
    }
}

fn load_theme(path: Option<&Path>) -> Result<ThemeTokens, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            let theme: ThemeTokens = serde_json::from_str(&json)
                .map_err(|e| format!("Invalid theme file {}: {}", path.display(), e))?;
            Ok(theme)
        }
        None => Ok(ThemeTokens::default()),
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Paginate {
            input,
            output,
            compact,
            style,
        }) => cmd_paginate(&input, output.as_deref(), compact, &style),
        Some(Commands::Export {
            input,
            output,
            style,
        }) => cmd_export(&input, output.as_deref(), &style),
        Some(Commands::Css {
            surface,
            selector,
            style,
        }) => cmd_css(&surface, selector.as_deref(), &style),
        Some(Commands::Scale {
            width,
            height,
            format,
            thumbnail,
        }) => {
            cmd_scale(width, height, format, thumbnail);
            Ok(())
        }
        Some(Commands::Info { format, theme }) => cmd_info(format, theme.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: pagemark <COMMAND> <FILE>".yellow());
            println!("       pagemark --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_paginate(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(input)?;
    let result = style.builder()?.render(&source)?;
    report_pagination(result.pages());

    let json = result.to_json(!compact)?;
    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_export(
    input: &Path,
    output: Option<&Path>,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(input)?;
    let result = style.builder()?.render(&source)?;
    report_pagination(result.pages());

    let document = result.to_print_document();
    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.with_extension("html"));
    fs::write(&output, document.to_standalone_html())?;

    println!(
        "{} {} ({} page(s), {})",
        "Saved to".green(),
        output.display(),
        document.page_count(),
        document.format
    );

    Ok(())
}

fn report_pagination(pages: &pagemark::Pagination) {
    if let Some(ref reason) = pages.degraded {
        eprintln!(
            "{}: pagination unavailable, output is a single page ({})",
            "Warning".yellow().bold(),
            reason
        );
    }
    for index in &pages.oversized {
        eprintln!(
            "{}: page {} holds content taller than one page and will be clipped",
            "Warning".yellow().bold(),
            index + 1
        );
    }
}

fn cmd_css(
    surface: &str,
    selector: Option<&str>,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let selector = selector.unwrap_or(match surface {
        "measure" => MEASURE_SELECTOR,
        "print" => PRINT_SELECTOR,
        _ => PREVIEW_SELECTOR,
    });
    let css = project_stylesheet(&style.theme()?, selector, &style.author_css()?);
    print!("{}", css);
    Ok(())
}

fn cmd_scale(width: f32, height: Option<f32>, format: PageFormat, thumbnail: bool) {
    let constraints = if thumbnail {
        ScaleConstraints::thumbnail()
    } else {
        ScaleConstraints::full_page()
    };
    let scale = resolve_scale(width, height, &format.geometry(), &constraints);
    println!("{:.4}", scale);
}

fn cmd_info(
    format: Option<PageFormat>,
    theme: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let theme = load_theme(theme)?;
    let formats: Vec<PageFormat> = match format {
        Some(format) => vec![format],
        None => PageFormat::ALL.to_vec(),
    };

    for format in formats {
        let geometry = format.geometry();
        println!("{}", format.name().cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!(
            "{}: {} x {} mm",
            "Paper".bold(),
            geometry.width_mm,
            geometry.height_mm
        );
        println!(
            "{}: {} x {} px",
            "Page".bold(),
            geometry.width_px,
            geometry.height_px
        );
        println!(
            "{}: {} x {} px (padding {}px)",
            "Usable".bold(),
            geometry.usable_width(theme.page_padding),
            geometry.usable_height(theme.page_padding),
            theme.page_padding
        );
        println!();
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagemark".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Paginated document tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pagemark".dimmed());
    println!("License: MIT");
}
