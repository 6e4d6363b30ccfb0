use anyhow::Result;
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use supplement_facts::config::AppConfig;
use supplement_facts::errors::error_logging;
use supplement_facts::observability;
use supplement_facts::{decode_model_response, SupplementFactsParser};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "supplement-facts",
    version,
    about = "Extract structured ingredients from supplement label OCR text"
)]
struct Cli {
    /// Label text file; reads stdin when omitted
    path: Option<PathBuf>,

    /// Treat the input as a vision model response instead of OCR text
    #[arg(long)]
    model_response: bool,
}

/// Read the input text from a file, or stdin when no path is given
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            let display = path.display().to_string();
            error_logging::log_filesystem_error(&e, "read_input", Some(&display));
            anyhow::anyhow!("Failed to read '{}': {}", display, e)
        }),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(|e| {
                error_logging::log_filesystem_error(&e, "read_stdin", None);
                anyhow::anyhow!("Failed to read stdin: {}", e)
            })?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::from_env().map_err(|e| {
        error_logging::log_config_error(&e, "environment", "load_config");
        anyhow::anyhow!("Configuration loading failed: {}", e)
    })?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    observability::init_tracing_with_config(&config.observability)?;
    let metrics_handle = if config.observability.enable_metrics_export {
        Some(observability::init_metrics_with_config(&config.observability)?)
    } else {
        None
    };
    info!("{}", config.summary());

    let input = read_input(cli.path.as_deref())?;

    let result = if cli.model_response {
        decode_model_response(&input, &config.parser)
    } else {
        let parser = SupplementFactsParser::with_config(config.parser.clone())?;
        parser.parse(&input)
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["supplement-facts"]).unwrap();
        assert!(cli.path.is_none());
        assert!(!cli.model_response);

        let cli = Cli::try_parse_from(["supplement-facts", "label.txt", "--model-response"]).unwrap();
        assert_eq!(cli.path.as_deref(), Some(Path::new("label.txt")));
        assert!(cli.model_response);

        assert!(Cli::try_parse_from(["supplement-facts", "a.txt", "b.txt"]).is_err());
        assert!(Cli::try_parse_from(["supplement-facts", "--verbose"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
