use clap::{Args, Parser, Subcommand};
use markcard::card::{CardNode, Document};
use markcard::config::{self, AppConfig};
use markcard::export::{
    ArboardClipboard, ChromeBackend, ClipboardSink, ExportDialog, ExportError, ExportFormat,
    copy_markdown,
};
use markcard::i18n::{Locale, LocaleState, Translator, env_locale_signal};
use markcard::output;
use markcard::prefs::{FileStore, KeyValueStore, MemoryStore};
use markcard::theme::ThemeId;
use std::error::Error;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Card content and appearance flags.
#[derive(Args, Clone)]
struct CardArgs {
    /// Markdown file; `-` or omitted reads stdin (the sample card when stdin is a terminal)
    input: Option<PathBuf>,

    /// Theme id (see `markcard themes`)
    #[arg(long)]
    theme: Option<String>,

    /// Background color override; empty string keeps the theme's
    #[arg(long)]
    background: Option<String>,

    /// Text color override; empty string keeps the theme's
    #[arg(long)]
    text: Option<String>,
}

/// Export settings flags. Each overrides the `[export]` config value.
#[derive(Args, Clone)]
struct ExportArgs {
    /// Image format
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Lossy encoding quality
    #[arg(long, value_parser = clap::value_parser!(u32).range(50..=100))]
    quality: Option<u32>,

    /// Pixel ratio, 1-4 in steps of 0.5
    #[arg(long)]
    scale: Option<f32>,

    /// Export on a transparent canvas (ignored by JPEG)
    #[arg(long)]
    no_background: bool,

    /// Output file name without extension
    #[arg(long)]
    name: Option<String>,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    Locale::parse(s).ok_or_else(|| {
        let ids: Vec<&str> = Locale::ALL.iter().map(|l| l.as_str()).collect();
        format!("unsupported language {s:?}; expected one of {}", ids.join(", "))
    })
}

#[derive(Parser)]
#[command(name = "markcard")]
#[command(about = "Turn Markdown into themed card images")]
#[command(long_about = "\
Turn Markdown into themed card images

Write Markdown, pick one of fourteen card themes, optionally override the
background and text colors, and export the card as PNG, JPEG or SVG.

Raster export drives a headless Chrome/Chromium, which must be installed.

Examples:

  markcard sample > card.md
  markcard export card.md --theme ocean --scale 3
  markcard export card.md --format svg --out-dir cards/
  cat card.md | markcard preview --data-uri
  markcard lang ja

Run 'markcard gen-config' to generate a documented markcard.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./markcard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language for this run only (en, zh, ja); `markcard lang` persists one
    #[arg(long, global = true, value_parser = parse_locale)]
    lang: Option<Locale>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the card as a standalone HTML page
    Card {
        #[command(flatten)]
        card: CardArgs,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the card and save it as an image
    Export {
        #[command(flatten)]
        card: CardArgs,
        #[command(flatten)]
        export: ExportArgs,
        /// Directory to write the image into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Render the card and report the preview image
    Preview {
        #[command(flatten)]
        card: CardArgs,
        #[command(flatten)]
        export: ExportArgs,
        /// Also print the image as a data: URI
        #[arg(long)]
        data_uri: bool,
    },
    /// Render the card and copy the image to the clipboard
    Copy {
        #[command(flatten)]
        card: CardArgs,
        #[command(flatten)]
        export: ExportArgs,
        /// Copy the Markdown source as text instead of the image
        #[arg(long)]
        markdown: bool,
    },
    /// List card themes
    Themes,
    /// List preset colors
    Colors,
    /// Show the current language, or set and persist one
    Lang {
        #[arg(value_parser = parse_locale)]
        locale: Option<Locale>,
    },
    /// Print the sample Markdown for the current language
    Sample,
    /// Print a stock markcard.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut store: Box<dyn KeyValueStore> = match FileStore::user_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "preferences unavailable, language will not persist");
            Box::new(MemoryStore::new())
        }
    };
    let mut locale = LocaleState::init(store.as_ref(), env_locale_signal().as_deref());
    let t = Translator::new(cli.lang.unwrap_or(locale.locale()));

    match cli.command {
        Command::Themes => {
            let app = load_config(cli.config.as_deref())?;
            output::print_themes(&t, ThemeId::parse(&app.card.theme));
        }
        Command::Colors => output::print_colors(&t),
        Command::Sample => print!("{}", t.default_markdown()),
        Command::GenConfig => print!("{}", config::stock_config_toml()),
        Command::Lang { locale: None } => output::print_languages(&t),
        Command::Lang {
            locale: Some(chosen),
        } => {
            locale.change(store.as_mut(), chosen)?;
            println!("{}", output::format_language_changed(&Translator::new(chosen)));
        }
        Command::Card { card, output: out } => {
            let mut app = load_config(cli.config.as_deref())?;
            apply_card_args(&mut app, &card)?;
            let node = render_card(&app, &card, &t)?;
            let html = node.document(None);
            match out {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    println!("{}", output::format_card_written(&t, &path));
                }
                None => print!("{html}"),
            }
        }
        Command::Export {
            card,
            export,
            out_dir,
        } => {
            let (node, dialog) = prepare(cli.config.as_deref(), &card, &export, &t, None)?;
            let result = dialog.download(&node, &out_dir).await;
            if let Some((path, payload)) = report(&dialog, result)? {
                output::print_export_summary(&t, &path, &payload, &dialog.config());
            }
        }
        Command::Preview {
            card,
            export,
            data_uri,
        } => {
            let (node, dialog) = prepare(cli.config.as_deref(), &card, &export, &t, None)?;
            let result = dialog.preview(&node).await;
            if let Some(payload) = report(&dialog, result)? {
                output::print_preview(&t, &payload, &dialog.config(), data_uri);
            }
        }
        Command::Copy {
            card,
            export,
            markdown,
        } => {
            let Some(clipboard) = ArboardClipboard::detect().map(Arc::new) else {
                eprintln!("{}", t.t("export.clipboardUnavailable"));
                return Err(Box::new(ExportError::ClipboardUnavailable) as Box<dyn Error>);
            };
            if markdown {
                let source = read_markdown(card.input.as_deref(), &t)?;
                if let Err(e) = copy_markdown(clipboard.as_ref(), &source) {
                    eprintln!("{}", t.t("editor.copyFailed"));
                    return Err(Box::new(e) as Box<dyn Error>);
                }
                println!("{}", t.t("editor.copiedSuccess"));
            } else {
                let sink = Arc::clone(&clipboard) as Arc<dyn ClipboardSink>;
                let (node, dialog) = prepare(cli.config.as_deref(), &card, &export, &t, Some(sink))?;
                let result = dialog.copy_to_clipboard(&node).await;
                if let Some(payload) = report(&dialog, result)? {
                    output::print_copied(&t, &payload);
                }
            }
            if clipboard.is_serving() {
                eprintln!("{}", t.t("export.keepingClipboard"));
                tokio::task::spawn_blocking(move || clipboard.wait_until_replaced()).await?;
            }
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig, Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    Ok(config::load_config(explicit, &cwd)?)
}

/// Apply card flags on top of the loaded config, then revalidate.
fn apply_card_args(app: &mut AppConfig, args: &CardArgs) -> Result<(), Box<dyn Error>> {
    if let Some(theme) = &args.theme {
        app.card.theme = theme.clone();
    }
    if let Some(background) = &args.background {
        app.card.background = background.clone();
    }
    if let Some(text) = &args.text {
        app.card.text = text.clone();
    }
    app.validate()?;
    Ok(())
}

fn apply_export_args(app: &mut AppConfig, args: &ExportArgs) -> Result<(), Box<dyn Error>> {
    if let Some(format) = args.format {
        app.export.format = format;
    }
    if let Some(quality) = args.quality {
        app.export.quality = quality;
    }
    if let Some(scale) = args.scale {
        app.export.scale = scale;
    }
    if args.no_background {
        app.export.include_background = false;
    }
    if let Some(name) = &args.name {
        app.export.file_name = name.clone();
    }
    app.validate()?;
    Ok(())
}

/// Read the card's Markdown: a file, stdin, or the sample text.
fn read_markdown(input: Option<&Path>, t: &Translator) -> std::io::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Ok(t.default_markdown());
            }
            let mut buf = String::new();
            stdin.read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn render_card(app: &AppConfig, args: &CardArgs, t: &Translator) -> Result<CardNode, Box<dyn Error>> {
    let (background, text) = app.card_colors()?;
    let document = Document {
        markdown: read_markdown(args.input.as_deref(), t)?,
        theme: app.card.theme.clone(),
        background,
        text,
    };
    Ok(document.render())
}

/// Resolve config, render the card, and open an export dialog for it.
fn prepare(
    config_path: Option<&Path>,
    card: &CardArgs,
    export: &ExportArgs,
    t: &Translator,
    clipboard: Option<Arc<dyn ClipboardSink>>,
) -> Result<(CardNode, ExportDialog), Box<dyn Error>> {
    let mut app = load_config(config_path)?;
    apply_card_args(&mut app, card)?;
    apply_export_args(&mut app, export)?;
    let node = render_card(&app, card, t)?;

    let export_config = app.export_config();
    if let Some(notice) = output::format_jpeg_notice(t, &export_config) {
        eprintln!("{notice}");
    }

    let backend = ChromeBackend::launch()?;
    let dialog = ExportDialog::new(Arc::new(backend), clipboard, *t).with_config(export_config);
    Ok((node, dialog))
}

/// Print the dialog's localized failure message before propagating the error.
fn report<T>(dialog: &ExportDialog, result: Result<Option<T>, ExportError>) -> Result<Option<T>, Box<dyn Error>> {
    result.map_err(|e| {
        if let Some(message) = dialog.error() {
            eprintln!("{message}");
        }
        Box::new(e) as Box<dyn Error>
    })
}
