mod config;
mod convert_cmd;
mod document;
mod process_cmd;
mod scan_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

use marksmith_core::gateway::ProviderKind;
use marksmith_core::marker::DocumentKind;

use config::ProviderFlags;
use convert_cmd::ConvertOptions;
use process_cmd::ProcessOptions;

#[derive(Parser)]
#[command(
    name = "marksmith",
    version,
    about = "Expand ;;markers;; in LaTeX and Markdown into generated math and prose"
)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Generation provider: openai, anthropic or gemini (overrides MARKSMITH_PROVIDER)
    #[arg(long, global = true)]
    provider: Option<ProviderKind>,

    /// Model name (overrides MARKSMITH_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Provider base URL (overrides MARKSMITH_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn provider_flags(&self) -> ProviderFlags {
        ProviderFlags {
            provider: self.provider,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a marksmith config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// List the markers found in a file
    Scan {
        /// LaTeX or Markdown file
        file: PathBuf,
        /// Document kind (default: from the file extension)
        #[arg(long)]
        kind: Option<DocumentKind>,
    },
    /// Replace the markers in a file with generated text
    Process {
        /// LaTeX or Markdown file
        file: PathBuf,
        /// Document kind (default: from the file extension)
        #[arg(long)]
        kind: Option<DocumentKind>,
        /// Only process this line (1-based)
        #[arg(long)]
        line: Option<usize>,
        /// Write the result back to the file instead of stdout
        #[arg(long)]
        in_place: bool,
        /// Directory holding .marksmith.md (default: current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
    },
    /// Convert a piece of text to a math expression
    Convert {
        /// Informal description of the expression
        text: String,
        /// File to take preceding context from
        #[arg(long)]
        file: Option<PathBuf>,
        /// Line in --file the text belongs on (1-based; default: end of file)
        #[arg(long, requires = "file")]
        line: Option<usize>,
        /// Document kind (default: from --file, else latex)
        #[arg(long)]
        kind: Option<DocumentKind>,
        /// Directory holding .marksmith.md (default: current directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

/// Execute the `marksmith init` command: write config file.
fn cmd_init(provider: Option<ProviderKind>, model: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let kind = provider.unwrap_or_default();
    let model = model.unwrap_or(kind.suggested_model()).to_string();

    let cfg = config::ConfigFile {
        provider: config::ProviderSection {
            kind,
            model: Some(model.clone()),
            ..config::ProviderSection::default()
        },
        ..config::ConfigFile::default()
    };

    let path = config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  provider.kind = {kind}");
    println!("  provider.model = {model}");
    println!();
    println!(
        "Next: set provider.api_key in that file or export {}.",
        config::ENV_API_KEY
    );

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let flags = cli.provider_flags();
    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.provider, cli.model.as_deref(), force)?;
        }
        Commands::Scan { file, kind } => {
            scan_cmd::run_scan(&file, kind)?;
        }
        Commands::Process {
            file,
            kind,
            line,
            in_place,
            project_root,
        } => {
            let options = ProcessOptions {
                file,
                kind,
                line,
                in_place,
                project_root,
            };
            process_cmd::run_process(&options, &flags).await?;
        }
        Commands::Convert {
            text,
            file,
            line,
            kind,
            project_root,
        } => {
            let options = ConvertOptions {
                text,
                file,
                line,
                kind,
                project_root,
            };
            convert_cmd::run_convert(&options, &flags).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "marksmith", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_provider_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "marksmith",
            "process",
            "paper.tex",
            "--provider",
            "anthropic",
            "--model",
            "claude-3-5-haiku-latest",
            "--line",
            "3",
        ]);
        let flags = cli.provider_flags();
        assert_eq!(flags.provider, Some(ProviderKind::Anthropic));
        assert_eq!(flags.model.as_deref(), Some("claude-3-5-haiku-latest"));
        match cli.command {
            Commands::Process { line, in_place, .. } => {
                assert_eq!(line, Some(3));
                assert!(!in_place);
            }
            _ => panic!("expected process"),
        }
    }

    #[test]
    fn convert_line_requires_file() {
        let result = Cli::try_parse_from(["marksmith", "convert", "x squared", "--line", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn kind_flag_accepts_short_names() {
        let cli = Cli::parse_from(["marksmith", "scan", "notes.txt", "--kind", "md"]);
        match cli.command {
            Commands::Scan { kind, .. } => assert_eq!(kind, Some(DocumentKind::Markdown)),
            _ => panic!("expected scan"),
        }
    }
}
