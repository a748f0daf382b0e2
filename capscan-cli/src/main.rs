//! Command-line interface for capscan
//! This binary extracts capability data from indentation-formatted signaling dumps.
//!
//! Usage:
//!   capscan report `<path>` [--format json|yaml]       - Capability report of one attach
//!   capscan combos `<path>`                            - EN-DC band combinations, one per line
//!   capscan find `<path>` `<marker>` [--with-header]   - Everything nested under a marker
//!   capscan entries `<path>` `<marker>`                - The sibling entries of a list marker
//!   capscan instances `<path>` `<marker>`              - Messages that mention a marker
//!   capscan rlf `<path>`                               - Radio link failure signs, one per line
//!
//! `<path>` may be `-` to read the dump from stdin. Global options: `--config <file>` layers a
//! TOML file over the built-in defaults, `-v` raises the log level (repeatable).
//!
//! `$XDG_CONFIG_HOME/capscan/config.toml` (or `~/.config/capscan/config.toml`) is layered under
//! `--config` when it exists.

use capscan_config::{user_config_path, CapscanConfig, Loader, OutputFormat};
use capscan_parser::capscan::capability::CapabilityExtractor;
use capscan_parser::capscan::{
    extract_block, extract_subtree, find_blocks, find_instances_containing, find_occurrences,
    find_radio_link_failures, lines_from_bytes, partition_siblings, Line, Subtree,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Read;

fn main() {
    let matches = build_cli().get_matches();
    let Some((name, sub)) = matches.subcommand() else {
        unreachable!("clap requires a subcommand");
    };
    // Global options are propagated into the subcommand's matches
    let config = load_config(sub);
    init_logging(sub, &config);

    match name {
        "report" => handle_report_command(sub, &config),
        "combos" => handle_combos_command(sub, &config),
        "find" => handle_find_command(sub),
        "entries" => handle_entries_command(sub),
        "instances" => handle_instances_command(sub),
        "rlf" => handle_rlf_command(sub),
        _ => unreachable!("unknown subcommand {}", name),
    }
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the dump, or - for stdin")
        .required(true)
        .index(1)
}

fn marker_arg() -> Arg {
    Arg::new("marker")
        .help("Element name to look for (case-sensitive substring)")
        .required(true)
        .index(2)
}

fn build_cli() -> Command {
    Command::new("capscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract UE capabilities and band combinations from signaling dumps")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log extraction decisions (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("report")
                .about("Print the capability report of a dump")
                .arg(path_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["json", "yaml"])
                        .help("Output format (default: output.format from configuration)"),
                ),
        )
        .subcommand(
            Command::new("combos")
                .about("Print the EN-DC band combinations a device declares")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("find")
                .about("Print the subtree under every occurrence of a marker")
                .arg(path_arg())
                .arg(marker_arg())
                .arg(
                    Arg::new("with-header")
                        .long("with-header")
                        .action(ArgAction::SetTrue)
                        .help("Include the matching line itself"),
                ),
        )
        .subcommand(
            Command::new("entries")
                .about("Split the list under a marker into its sibling entries")
                .arg(path_arg())
                .arg(marker_arg()),
        )
        .subcommand(
            Command::new("instances")
                .about("Print every message that mentions a marker")
                .arg(path_arg())
                .arg(marker_arg()),
        )
        .subcommand(
            Command::new("rlf")
                .about("Print the radio link failure signs in a dump")
                .arg(path_arg()),
        )
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn load_config(sub: &ArgMatches) -> CapscanConfig {
    let mut loader = Loader::new();
    if let Some(path) = user_config_path() {
        loader = loader.with_optional_file(path);
    }
    if let Some(path) = sub.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    let format = sub.try_get_one::<String>("format").ok().flatten();
    if let Some(format) = format {
        loader = loader
            .set_override("output.format", format.as_str())
            .unwrap_or_else(|e| fail(e));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("invalid configuration: {}", e)))
}

/// RUST_LOG wins over `-v`, which wins over `logging.level`.
fn init_logging(matches: &ArgMatches, config: &CapscanConfig) {
    let level = match matches.get_count("verbose") {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::new()
        .parse_filters(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn read_dump(sub: &ArgMatches) -> Vec<Line> {
    let path = sub
        .get_one::<String>("path")
        .expect("path is a required argument");
    let bytes = if path == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .unwrap_or_else(|e| fail(format!("cannot read stdin: {}", e)));
        buffer
    } else {
        std::fs::read(path).unwrap_or_else(|e| fail(format!("cannot read {}: {}", path, e)))
    };
    log::debug!("read {} byte(s) from {}", bytes.len(), path);
    lines_from_bytes(&bytes).unwrap_or_else(|e| fail(e))
}

fn marker(sub: &ArgMatches) -> &str {
    sub.get_one::<String>("marker")
        .expect("marker is a required argument")
}

fn print_section(title: String, subtree: &Subtree) {
    println!("-- {} --", title);
    println!("{}", subtree.render());
}

/// Handle the report command
fn handle_report_command(sub: &ArgMatches, config: &CapscanConfig) {
    let lines = read_dump(sub);
    let report = CapabilityExtractor::new(config.extraction_settings())
        .extract(&lines)
        .unwrap_or_else(|e| fail(e));

    let formatted = match config.output.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(&report).map_err(|e| e.to_string()),
    }
    .unwrap_or_else(|e| fail(format!("cannot format report: {}", e)));

    println!("{}", formatted.trim_end());
}

/// Handle the combos command
fn handle_combos_command(sub: &ArgMatches, config: &CapscanConfig) {
    let lines = read_dump(sub);
    let combos = config
        .combos
        .endc_combos(&lines)
        .unwrap_or_else(|e| fail(e));
    for combo in combos {
        println!("{}", combo);
    }
}

/// Handle the find command
fn handle_find_command(sub: &ArgMatches) {
    let lines = read_dump(sub);
    let marker = marker(sub);
    let occurrences = find_occurrences(&lines, marker);

    if occurrences.is_empty() {
        println!("no occurrence of {}", marker);
        return;
    }
    let with_header = sub.get_flag("with-header");
    for position in occurrences {
        let title = format!("line {}", position + 1);
        let subtree = extract_subtree(&lines, position);
        if subtree.is_empty() {
            println!("-- {} (no nested lines) --", title);
            println!("{}", lines[position].text());
        } else if with_header {
            print_section(title, &extract_block(&lines, position));
        } else {
            print_section(title, &subtree);
        }
    }
}

/// Handle the entries command
fn handle_entries_command(sub: &ArgMatches) {
    let lines = read_dump(sub);
    let marker = marker(sub);
    let blocks = find_blocks(&lines, marker);

    if blocks.is_empty() {
        println!("no occurrence of {}", marker);
        return;
    }
    for block in &blocks {
        let entries = partition_siblings(block).unwrap_or_else(|e| fail(e));
        for (number, entry) in entries.iter().enumerate() {
            print_section(
                format!("entry {} at line {}", number + 1, entry.start() + 1),
                entry,
            );
        }
    }
}

/// Handle the instances command
fn handle_instances_command(sub: &ArgMatches) {
    let lines = read_dump(sub);
    let marker = marker(sub);
    let instances = find_instances_containing(&lines, marker);

    if instances.is_empty() {
        println!("no message mentions {}", marker);
        return;
    }
    let rendered: Vec<String> = instances
        .iter()
        .map(|instance| Subtree::new(instance.lines(), instance.start()).render())
        .collect();
    println!("{}", rendered.join("\n\n"));
}

/// Handle the rlf command
fn handle_rlf_command(sub: &ArgMatches) {
    let lines = read_dump(sub);
    let findings = find_radio_link_failures(&lines);

    if findings.is_empty() {
        println!("no radio link failure");
        return;
    }
    for finding in &findings {
        println!("{}", finding);
    }
}
