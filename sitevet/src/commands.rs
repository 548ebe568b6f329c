use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    command!("sitevet")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitevet")
        .styles(CLAP_STYLING)
        .about("Crawl a target site and scan each page for common vulnerability signatures")
        .arg(
            arg!(<URL> "The target URL to scan. Bare host names default to https.")
                .required(true),
        )
        .arg(
            arg!(--"intruder" <PARAM>)
                .required(false)
                .help("After the crawl, fuzz the named query parameter on the target URL"),
        )
        .arg(
            arg!(--"repeater")
                .required(false)
                .help("After the crawl, repeat a GET against the target URL")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"iterations" <NUM>)
                .required(false)
                .help("Number of repeater iterations")
                .value_parser(clap::value_parser!(usize))
                .default_value("2"),
        )
        .arg(
            arg!(-d --"depth" <DEPTH>)
                .required(false)
                .help("Maximum crawl depth from the target URL")
                .value_parser(clap::value_parser!(usize))
                .default_value("2"),
        )
        .arg(
            arg!(--"max-urls" <NUM>)
                .required(false)
                .help("Hard cap on the total number of URLs visited in one run")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64))
                .default_value("5"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save the report to a file (default: print to screen)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: markdown, json")
                .value_parser(["markdown", "md", "json"])
                .default_value("markdown"),
        )
        .arg(arg!(-q --"quiet" "Suppress banner and summary output").required(false))
}
