use crate::config::DocConfig;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate REST API documentation from annotated Rust controller sources
#[derive(Parser, Debug)]
#[command(name = "apidoc-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Fail on methods and primitive parameters without doc comments
    #[arg(long)]
    pub strict: bool,

    /// Comma-separated qualified-name prefixes or globs of controllers to document
    #[arg(long, value_name = "FILTERS")]
    pub package_filters: Option<String>,

    /// Omit `@author` from the output
    #[arg(long)]
    pub hide_author: bool,

    /// Prefix for every documented URL
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!("Project path does not exist: {}", args.project_path.display());
    }
    if !args.project_path.is_dir() {
        anyhow::bail!("Project path is not a directory: {}", args.project_path.display());
    }
    if let Some(config_path) = &args.config_path {
        if !config_path.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config_path.display());
        }
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// The configuration file, if any, with command line flags applied on top
pub fn load_config(args: &CliArgs) -> Result<DocConfig> {
    let mut config = match &args.config_path {
        Some(path) => DocConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => DocConfig::default(),
    };

    if args.strict {
        config.strict = true;
    }
    if args.hide_author {
        config.show_author = false;
    }
    if let Some(filters) = &args.package_filters {
        config.package_filters = Some(filters.clone());
    }
    if let Some(server_url) = &args.server_url {
        config.server_url = server_url.clone();
    }

    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::doc_builder::DocBuilder;
    use crate::extractor::controller::ControllerExtractor;
    use crate::extractor::DeclarationExtractor;
    use crate::parser::{AstParser, ParsedFile};
    use crate::scanner::FileScanner;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
    use crate::type_resolver::TypeResolver;

    info!("Starting API documentation generation...");
    let config = load_config(&args)?;

    // Step 1: Scan directory for Rust files
    info!("Scanning project directory...");
    let scanner = FileScanner::new(args.project_path.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} Rust files", scan_result.rust_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }
    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Parse files into AST
    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(scanner.root_path(), &scan_result.rust_files)
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {:#}", e);
                None
            }
        })
        .collect();

    info!("Successfully parsed {} files", parsed_files.len());
    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    // Step 3: Extract declarations and index types
    info!("Extracting declarations...");
    let declarations = ControllerExtractor.extract_declarations(&parsed_files);
    let controllers = declarations.iter().filter(|d| d.is_controller()).count();
    info!("Found {} declarations, {} controllers", declarations.len(), controllers);
    if controllers == 0 {
        warn!("No controllers found in the project");
    }

    let type_resolver = TypeResolver::new(&parsed_files);
    info!("Indexed {} types", type_resolver.len());

    // Step 4: Build the documentation model
    info!("Building API documentation...");
    let docs = DocBuilder::new(&config, &type_resolver)?.build(&declarations)?;
    let methods: usize = docs.iter().map(|doc| doc.list.len()).sum();

    // Step 5: Serialize and output
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&docs)?,
        OutputFormat::Json => serialize_json(&docs)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.rust_files.len());
    info!("  - Files parsed: {}", parsed_files.len());
    info!("  - Controllers documented: {}", docs.len());
    info!("  - Methods documented: {}", methods);

    Ok(())
}
