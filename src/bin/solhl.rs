//! Command-line interface for solhl
//! Highlights Solidity and Yul sources for the terminal, for HTML pages, or as data.
//!
//! Usage:
//!   solhl highlight `<path|->` [-l `<language>`] [-f `<format>`] [-c `<config>`] [--ignore-illegals]
//!   solhl detect `<path|->` [-c `<config>`]     - Report the detected language and its relevance
//!   solhl languages                           - List the available grammars
//!
//! Settings come from the embedded defaults, then `./solhl.toml` if present, then the file given
//! with `--config`, then command line flags. `RUST_LOG=debug` shows what the engine is doing.

use clap::{Arg, ArgAction, ArgMatches, Command};
use solhl::engine::HighlightOptions;
use solhl::render::{AnsiFormat, FormatRegistry, HtmlFormat, Theme};
use solhl::{Highlight, Highlighter};
use solhl_config::{Loader, SolhlConfig};
use std::io::Read;

const LOCAL_CONFIG: &str = "solhl.toml";

fn main() {
    env_logger::init();

    let path_arg = Arg::new("path")
        .help("Source file, or - for stdin")
        .default_value("-")
        .index(1);
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .help("Configuration file layered over the defaults");

    let matches = Command::new("solhl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Syntax highlighting for Solidity and Yul")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("highlight")
                .about("Highlight a source file")
                .arg(path_arg.clone())
                .arg(
                    Arg::new("language")
                        .long("language")
                        .short('l')
                        .help("Grammar name or alias, or 'auto' to detect"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (html, ansi, tokens, json, yaml)"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("ignore-illegals")
                        .long("ignore-illegals")
                        .help("Keep regions open when they meet an illegal pattern")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("detect")
                .about("Detect the language of a source file")
                .arg(path_arg)
                .arg(config_arg),
        )
        .subcommand(Command::new("languages").about("List available grammars"))
        .get_matches();

    match matches.subcommand() {
        Some(("highlight", highlight_matches)) => handle_highlight_command(highlight_matches),
        Some(("detect", detect_matches)) => handle_detect_command(detect_matches),
        Some(("languages", _)) => handle_languages_command(),
        _ => unreachable!(),
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, err);
    std::process::exit(1);
}

fn load_config(matches: &ArgMatches) -> SolhlConfig {
    let mut loader = Loader::new().with_optional_file(LOCAL_CONFIG);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }

    let overrides = [
        ("highlight.language", "language"),
        ("output.format", "format"),
    ];
    for (key, arg) in overrides {
        let value = matches
            .try_get_one::<String>(arg)
            .ok()
            .flatten()
            .cloned();
        if let Some(value) = value {
            loader = loader
                .set_override(key, value)
                .unwrap_or_else(|e| fail("Invalid option", e));
        }
    }
    if matches!(matches.try_get_one::<bool>("ignore-illegals"), Ok(Some(true))) {
        loader = loader
            .set_override("highlight.ignore_illegals", true)
            .unwrap_or_else(|e| fail("Invalid option", e));
    }

    loader
        .build()
        .unwrap_or_else(|e| fail("Error loading configuration", e))
}

fn read_source(matches: &ArgMatches) -> String {
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or("-");
    if path == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .unwrap_or_else(|e| fail("Error reading stdin", e));
        source
    } else {
        std::fs::read_to_string(path).unwrap_or_else(|e| fail("Error reading file", e))
    }
}

fn highlighter(config: &SolhlConfig) -> Highlighter {
    Highlighter::with_builtin()
        .unwrap_or_else(|e| fail("Error building grammars", e))
        .with_options(HighlightOptions {
            ignore_illegals: config.highlight.ignore_illegals,
        })
}

fn highlight_source(highlighter: &Highlighter, config: &SolhlConfig, source: &str) -> Highlight {
    if config.highlight.detects_language() {
        highlighter.highlight_auto(source).best
    } else {
        highlighter
            .highlight(source, &config.highlight.language)
            .unwrap_or_else(|e| fail("Error", e))
    }
}

/// Handle the highlight command
fn handle_highlight_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let source = read_source(matches);
    let highlight = highlight_source(&highlighter(&config), &config, &source);

    let theme = Theme::default()
        .with_names(&config.theme)
        .unwrap_or_else(|e| fail("Invalid theme", e));
    let mut formats = FormatRegistry::with_defaults();
    formats.register(HtmlFormat::new(config.output.class_prefix.clone()));
    formats.register(AnsiFormat { theme });

    let output = formats
        .render(&highlight, &config.output.format)
        .unwrap_or_else(|e| fail("Error rendering output", e));
    print!("{}", output);
}

/// Handle the detect command
fn handle_detect_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let source = read_source(matches);
    let auto = highlighter(&config).highlight_auto(&source);

    println!("{}\t{}", auto.best.language, auto.best.relevance);
    if let Some(second) = auto.second_best {
        println!("{}\t{}", second.language, second.relevance);
    }
}

/// Handle the languages command
fn handle_languages_command() {
    let highlighter = Highlighter::with_builtin().unwrap_or_else(|e| fail("Error building grammars", e));
    println!("Available languages:\n");
    for grammar in highlighter.languages() {
        if grammar.aliases().is_empty() {
            println!("  {}", grammar.name());
        } else {
            println!("  {} ({})", grammar.name(), grammar.aliases().join(", "));
        }
    }
}
