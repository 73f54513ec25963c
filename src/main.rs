#![allow(clippy::multiple_crate_versions)]

mod commands;

use std::path::PathBuf;

use clap::{value_parser, Arg, Command};
use yakabot_responder::DEFAULT_FALLBACK;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let matches = Command::new("yakabot")
        .version(VERSION)
        .about("Yakafokon - a Mattermost responder bot with live-editable rules")
        .subcommand(
            Command::new("run")
                .about("Connect to Mattermost and answer messages in the monitored channel")
                .arg(
                    Arg::new("no-match-reply")
                        .long("no-match-reply")
                        .value_name("TEXT")
                        .help("Reply with TEXT when no rule matches (silent by default)")
                        .num_args(0..=1)
                        .default_missing_value(DEFAULT_FALLBACK),
                )
                .arg(
                    Arg::new("interaction-log")
                        .long("interaction-log")
                        .value_name("PATH")
                        .help("Append one JSON line per handled message to PATH")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("rules").about("Print the rule table the bot starts with"),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run::run(sub_matches).await,
        Some(("rules", _)) => commands::rules::run(),
        _ => {
            println!("Yakafokon v{}", VERSION);
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}
