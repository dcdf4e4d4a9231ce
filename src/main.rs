use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use html2docx::docx::save_docx;
use html2docx::{html_to_document, ConvertOptions, HeadingFormatting, UnknownTagPolicy};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeadingArg {
    Flatten,
    PreserveInline,
}

impl From<HeadingArg> for HeadingFormatting {
    fn from(arg: HeadingArg) -> Self {
        match arg {
            HeadingArg::Flatten => HeadingFormatting::Flatten,
            HeadingArg::PreserveInline => HeadingFormatting::PreserveInline,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnknownTagsArg {
    Ignore,
    Descend,
}

impl From<UnknownTagsArg> for UnknownTagPolicy {
    fn from(arg: UnknownTagsArg) -> Self {
        match arg {
            UnknownTagsArg::Ignore => UnknownTagPolicy::Ignore,
            UnknownTagsArg::Descend => UnknownTagPolicy::Descend,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input HTML file (any fragment or full document).
    #[arg(long)]
    html_file: PathBuf,

    /// Output .docx path. Defaults to converted_document_<timestamp>.docx.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Document title, used when the HTML has no <title>.
    #[arg(long)]
    title: Option<String>,

    /// JSON file with conversion options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep paragraphs that contain no visible text.
    #[arg(long)]
    keep_empty_paragraphs: bool,

    #[arg(long, value_enum)]
    heading_formatting: Option<HeadingArg>,

    /// What to do with block elements the converter does not recognize.
    #[arg(long, value_enum)]
    unknown_tags: Option<UnknownTagsArg>,

    /// Log conversion details to stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::from_json_file(path)
                .with_context(|| format!("load options {}", path.display()))?,
            None => ConvertOptions::default(),
        };
        if self.keep_empty_paragraphs {
            options.skip_empty_paragraphs = false;
        }
        if let Some(h) = self.heading_formatting {
            options.heading_formatting = h.into();
        }
        if let Some(u) = self.unknown_tags {
            options.unknown_tags = u.into();
        }
        if self.title.is_some() {
            options.fallback_title = self.title.clone();
        }
        Ok(options)
    }
}

fn default_output_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("converted_document_{timestamp}.docx"))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = args.options()?;

    let mut html = String::new();
    File::open(&args.html_file)
        .with_context(|| format!("open {}", args.html_file.display()))?
        .read_to_string(&mut html)
        .with_context(|| format!("read {}", args.html_file.display()))?;

    if html.trim().is_empty() {
        return Err(anyhow!("empty html"));
    }

    let doc = html_to_document(&html, &options)
        .with_context(|| format!("convert {}", args.html_file.display()))?;

    let out = args.out.clone().unwrap_or_else(default_output_path);
    save_docx(&doc, &out).with_context(|| format!("write {}", out.display()))?;

    log::info!("{} blocks written", doc.blocks.len());
    println!("{}", out.display());
    Ok(())
}
