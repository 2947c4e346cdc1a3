// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Certificate Template Key Archival Tool
//!
//! Resolves the key archival settings of an exported certificate template.
//!
//! # Usage
//!
//! ```text
//! template-archival [OPTIONS] <COMMAND>
//!
//! Commands:
//!   directory  Resolve from a directory-record export (TOML or JSON)
//!   policy     Resolve from a policy-object export (TOML or JSON)
//!   parse      Parse an RA application policies string and list its fields
//!
//! Options:
//!   -c, --config <PATH>          Path to configuration file
//!   -r, --representation <REPR>  Integer representation: signed | unsigned
//!   -f, --format <FMT>           Output format: text | json
//!   -v, --verbose                Enable verbose output
//!   -q, --quiet                  Suppress non-error output
//!   -h, --help                   Print help
//!   -V, --version                Print version
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Resolve a template exported from the directory
//! template-archival directory KeyRecoveryUser.toml
//!
//! # Resolve a policy object export on a signed-integer host, as JSON
//! template-archival policy --representation signed --format json template.json
//!
//! # Inspect an attribute value
//! template-archival parse 'msPKI-Symmetric-Algorithm`PZPWSTR`3DES`msPKI-Symmetric-Key-Length`DWORD`168`'
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use usg_cert_template::directory::{self, DirectoryEntry};
use usg_cert_template::policy_object::{self, PolicyTemplate};
use usg_cert_template::{
    ConfigLoader, IntegerRepresentation, KeyArchivalSettings, OutputFormat,
    RaApplicationPolicies, TemplateError, TemplateSource,
};

/// Certificate Template Key Archival Tool
#[derive(Parser)]
#[command(name = "template-archival")]
#[command(author = "U.S. Federal Government")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve certificate template key archival settings", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Integer representation of the policy object host (signed | unsigned)
    #[arg(short, long, global = true, value_name = "REPR", value_parser = parse_representation)]
    representation: Option<IntegerRepresentation>,

    /// Output format (text | json)
    #[arg(short, long, global = true, value_name = "FMT", value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve from a directory-record export
    Directory {
        /// Exported record (.toml or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Resolve from a policy-object export
    Policy {
        /// Exported template (.toml or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse an RA application policies attribute value
    Parse {
        /// Attribute value
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

fn parse_representation(s: &str) -> Result<IntegerRepresentation, String> {
    s.parse().map_err(|e: TemplateError| e.to_string())
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: TemplateError| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(ref path) = cli.config {
        loader = loader.with_path(path);
    }
    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_level = if cli.quiet {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let representation = cli
        .representation
        .unwrap_or(config.resolver.integer_representation);
    let format = cli.format.unwrap_or(config.output.format);

    match run_command(&cli, representation, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_command(
    cli: &Cli,
    representation: IntegerRepresentation,
    format: OutputFormat,
) -> Result<(), TemplateError> {
    let resolver = usg_cert_template::KeyArchivalResolver::with_representation(representation);

    match &cli.command {
        Commands::Directory { file } => {
            let content = std::fs::read_to_string(file)?;
            let entry = if is_json(file) {
                DirectoryEntry::from_json(&content)?
            } else {
                DirectoryEntry::from_toml(&content)?
            };
            tracing::info!(
                "Resolving directory template {}",
                entry.distinguished_name.as_deref().unwrap_or("(unnamed)")
            );

            if cli.verbose && !cli.quiet {
                println!("Private key flags: {}", directory::private_key_flags(&entry)?);
            }
            let settings = resolver.resolve(TemplateSource::Directory(&entry))?;
            print_settings(&settings, format, cli.quiet)
        }

        Commands::Policy { file } => {
            let content = std::fs::read_to_string(file)?;
            let template = if is_json(file) {
                PolicyTemplate::from_json(&content)?
            } else {
                PolicyTemplate::from_toml(&content)?
            };
            tracing::info!(
                "Resolving policy template {} ({} integers)",
                template.common_name.as_deref().unwrap_or("(unnamed)"),
                representation
            );

            if cli.verbose && !cli.quiet {
                println!(
                    "Private key flags: {}",
                    policy_object::private_key_flags(&template, representation)?
                );
            }
            let settings = resolver.resolve(TemplateSource::PolicyObject(&template))?;
            print_settings(&settings, format, cli.quiet)
        }

        Commands::Parse { value } => {
            let policies = RaApplicationPolicies::parse(value);
            if cli.quiet {
                return Ok(());
            }

            match format {
                OutputFormat::Text => {
                    if policies.is_empty() {
                        println!("No encoded fields found");
                    }
                    for field in policies.fields() {
                        println!("{} ({}): {}", field.name, field.kind, field.value);
                    }
                    if let Some(algorithm) = policies.symmetric_algorithm() {
                        println!("Symmetric algorithm: {}", algorithm.display_name());
                    }
                    if let Some(bits) = policies.symmetric_key_length() {
                        println!("Symmetric key length: {}", bits);
                    }
                }
                OutputFormat::Json => {
                    let document = serde_json::json!({
                        "fields": policies.fields(),
                        "symmetric_algorithm": policies.symmetric_algorithm(),
                        "symmetric_key_length": policies.symmetric_key_length(),
                    });
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
            }
            Ok(())
        }
    }
}

fn print_settings(
    settings: &KeyArchivalSettings,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), TemplateError> {
    if quiet {
        return Ok(());
    }
    match format {
        OutputFormat::Text => println!("{}", settings.render()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(settings)?),
    }
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
