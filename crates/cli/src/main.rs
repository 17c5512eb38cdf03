//! Terminal RSVP reader for PDF documents.

mod play;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rsvp_core::{bilingual, ExtractedDocument, Library, Settings, SourceFormat, TextTokenizer};
use rsvp_pdf::PdfParser;
use std::fs;
use std::path::{Path, PathBuf};

/// Read PDF documents one word at a time.
#[derive(Parser, Debug)]
#[command(name = "rsvp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Library file (default: <data dir>/rsvp/library.json)
    #[arg(long, env = "RSVP_LIBRARY", global = true)]
    library: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract PDF file(s) and add them to the library
    Import {
        /// Input PDF file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Read as word pairs (fails for single-script documents)
        #[arg(long, conflicts_with = "no_bilingual")]
        bilingual: bool,

        /// Read one word at a time even if the settings default to pairs
        #[arg(long)]
        no_bilingual: bool,

        /// Title to use instead of the PDF metadata or filename
        #[arg(short, long)]
        title: Option<String>,
    },

    /// List documents in the library
    List,

    /// Print the word sequence of a library document or a PDF file
    Words {
        /// Document id, title, or path to a PDF
        document: String,

        /// Print bilingual pairs, one per line
        #[arg(short, long)]
        pairs: bool,
    },

    /// Read a document
    Play {
        /// Document id or title
        document: String,

        /// Words per minute (default: from settings)
        #[arg(short, long)]
        wpm: Option<u32>,

        /// Unit index to start from (default: saved position)
        #[arg(long)]
        from: Option<usize>,
    },

    /// Remove a document from the library
    Remove {
        /// Document id or title
        document: String,
    },

    /// Rewind a document to the beginning
    Reset {
        /// Document id or title
        document: String,
    },

    /// Show or change reader settings
    Config {
        /// Default words per minute
        #[arg(long)]
        wpm: Option<u32>,

        /// Import two-script documents as word pairs
        #[arg(long)]
        bilingual_default: Option<bool>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let library_path = match args.library {
        Some(path) => path,
        None => default_library_path()?,
    };
    log::debug!("Using library {}", library_path.display());

    let mut library = Library::load(&library_path)
        .with_context(|| format!("Failed to load library {}", library_path.display()))?;

    match args.command {
        Command::Import {
            input,
            bilingual,
            no_bilingual,
            title,
        } => {
            if title.is_some() && input.len() > 1 {
                bail!("--title can only be used with a single input file");
            }
            let mode = match (bilingual, no_bilingual) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            import_files(&mut library, &input, mode, title, args.verbose)
        }
        Command::List => {
            list_documents(&library);
            Ok(())
        }
        Command::Words { document, pairs } => print_words(&library, &document, pairs),
        Command::Play {
            document,
            wpm,
            from,
        } => {
            let id = library.resolve(&document)?;
            let wpm = wpm.unwrap_or(library.settings().wpm);
            play::run(&mut library, id, wpm, from)
        }
        Command::Remove { document } => {
            let id = library.resolve(&document)?;
            let removed = library.remove(id)?;
            library.save()?;
            println!("Removed #{} {}", removed.id, removed.title);
            Ok(())
        }
        Command::Reset { document } => {
            let id = library.resolve(&document)?;
            library.reset(id)?;
            library.save()?;
            Ok(())
        }
        Command::Config {
            wpm,
            bilingual_default,
        } => configure(&mut library, wpm, bilingual_default),
    }
}

/// Default library location in the platform data directory.
fn default_library_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory; pass --library"))?;
    Ok(data_dir.join("rsvp").join("library.json"))
}

/// Read and extract a single PDF file.
fn extract_file(input_path: &Path) -> Result<ExtractedDocument> {
    let bytes = fs::read(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    let format = SourceFormat::from_magic(&bytes)
        .or_else(|| {
            input_path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(SourceFormat::from_extension)
        })
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format"))?;

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let document = match format {
        SourceFormat::Pdf => {
            log::debug!("Parsing as PDF");
            PdfParser::new()
                .parse_bytes(&bytes, filename)
                .map_err(|e| anyhow::anyhow!("{}", e))?
        }
    };

    Ok(document)
}

/// Import each file, reporting failures and continuing with the rest.
fn import_files(
    library: &mut Library,
    inputs: &[PathBuf],
    bilingual: Option<bool>,
    title: Option<String>,
    verbose: bool,
) -> Result<()> {
    let tokenizer = TextTokenizer::new();
    let mut imported = 0;

    for input_path in inputs {
        if verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        let result = extract_file(input_path).and_then(|extracted| {
            if verbose {
                eprintln!("  Found {} pages", extracted.page_count());
            }
            let id = match &title {
                Some(title) => library.import_words(
                    title.clone(),
                    extracted.filename.clone(),
                    tokenizer.tokenize_pages(&extracted.pages),
                    bilingual,
                )?,
                None => library.import(&extracted, &tokenizer, bilingual)?,
            };
            Ok(id)
        });

        match result {
            Ok(id) => {
                imported += 1;
                if let Some(doc) = library.get(id) {
                    println!(
                        "Imported #{} {} ({} words{})",
                        doc.id,
                        doc.title,
                        doc.words.len(),
                        if doc.bilingual { ", bilingual" } else { "" }
                    );
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input_path.display(), e);
            }
        }
    }

    if imported > 0 {
        library.save()?;
    }
    if imported < inputs.len() {
        bail!("{} of {} files failed to import", inputs.len() - imported, inputs.len());
    }

    Ok(())
}

fn list_documents(library: &Library) {
    if library.documents().is_empty() {
        println!("Library is empty. Add a PDF with `rsvp import <file>`.");
        return;
    }

    println!("{:>4}  {:>8}  {:>8}  {:<9}  TITLE", "ID", "PROGRESS", "WORDS", "MODE");
    for doc in library.documents() {
        println!(
            "{:>4}  {:>7.1}%  {:>8}  {:<9}  {}",
            doc.id,
            doc.progress() * 100.0,
            doc.words.len(),
            if doc.bilingual { "bilingual" } else { "words" },
            doc.title
        );
    }
}

fn print_words(library: &Library, document: &str, pairs: bool) -> Result<()> {
    let path = Path::new(document);
    let words = if path.is_file() {
        let extracted = extract_file(path)?;
        TextTokenizer::new().tokenize_pages(&extracted.pages)
    } else {
        let id = library.resolve(document)?;
        library
            .get(id)
            .map(|doc| doc.words.clone())
            .unwrap_or_default()
    };

    if pairs {
        let paired = bilingual::pair(&words)
            .ok_or_else(|| anyhow::anyhow!("Document does not contain two scripts to pair"))?;
        for pair in &paired.pairs {
            println!("{}\t{}", pair.primary, pair.secondary);
        }
    } else {
        for word in &words {
            println!("{}", word);
        }
    }

    Ok(())
}

fn configure(library: &mut Library, wpm: Option<u32>, bilingual_default: Option<bool>) -> Result<()> {
    if wpm.is_some() || bilingual_default.is_some() {
        let current = library.settings().clone();
        library.update_settings(Settings {
            wpm: wpm.unwrap_or(current.wpm),
            bilingual_by_default: bilingual_default.unwrap_or(current.bilingual_by_default),
        });
        library.save()?;
    }

    let settings = library.settings();
    println!("library:           {}", library.path().display());
    println!("wpm:               {}", settings.wpm);
    println!("bilingual_default: {}", settings.bilingual_by_default);
    Ok(())
}
