// Main CLI entry point for mailswap
// Uses clap for argument parsing

use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use mailswap::annotation::HistoryAnnotator;
use mailswap::config::DetectorConfig;
use mailswap::detection::{EmailChangeListener, HttpListener};
use mailswap::forwarder::WorkbenchForwarder;
use mailswap::menu::{ContextMenu, InvocationContext, MenuItem};
use mailswap::models::CapturedRequest;
use mailswap::parsers::load_captures;
use mailswap::reporting::{export_csv, export_markdown};
use mailswap::request_logger::RequestLogger;
use std::path::Path;
use std::process;
use std::sync::Arc;

fn main() {
    let matches = Command::new("mailswap")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Jake Abendroth")
        .about("Detects email-change requests in intercepted HTTP traffic")
        .after_help("EXAMPLES:\n  mailswap --input proxy-history.har\n  mailswap -i captures/ -c vocab.json --forward-url http://127.0.0.1:8090/workbench\n  mailswap --generate-config vocab.json")
        .arg(Arg::new("input")
            .short('i')
            .long("input")
            .num_args(1)
            .required_unless_present("generate_config")
            .help("Capture file (.json, .jsonl, .har) or directory of capture files"))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .num_args(1)
            .help("JSON detector configuration (keywords, URL patterns, dedup window)"))
        .arg(Arg::new("generate_config")
            .long("generate-config")
            .value_name("FILE")
            .num_args(1)
            .help("Write the default configuration to FILE and exit"))
        .arg(Arg::new("forward_url")
            .long("forward-url")
            .num_args(1)
            .help("Send detected requests to this workbench endpoint"))
        .arg(Arg::new("log_requests")
            .long("log-requests")
            .action(ArgAction::SetTrue)
            .help("Also print every intercepted request"))
        .arg(Arg::new("csv_report")
            .long("csv-report")
            .action(ArgAction::SetTrue)
            .help("Write a CSV report of detections"))
        .arg(Arg::new("markdown_report")
            .long("markdown-report")
            .action(ArgAction::SetTrue)
            .help("Write a Markdown report of detections"))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Enable debug logging"))
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate_config") {
        if let Err(e) = DetectorConfig::default().save(path) {
            log::error!("Failed to write configuration to {}: {}", path, e);
            process::exit(1);
        }
        println!("Default configuration written to {}", path);
        return;
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => DetectorConfig::load(path).unwrap_or_else(|e| {
            log::error!("Failed to load configuration {}: {}", path, e);
            process::exit(1);
        }),
        None => DetectorConfig::default(),
    };

    let history = Arc::new(HistoryAnnotator::new());
    let listener = EmailChangeListener::from_config(&config)
        .unwrap_or_else(|e| {
            log::error!("Invalid configuration: {}", e);
            process::exit(1);
        })
        .with_annotator(Box::new(Arc::clone(&history)));

    let Some(input) = matches.get_one::<String>("input") else {
        log::error!("--input is required");
        process::exit(2);
    };
    let captures = load_captures(input).unwrap_or_else(|e| {
        log::error!("Failed to load captures from {}: {}", input, e);
        process::exit(1);
    });
    println!("Loaded {} requests.", captures.len());

    let log_requests = matches.get_flag("log_requests");
    let mut detections = Vec::new();
    let mut detected_messages: Vec<CapturedRequest> = Vec::new();

    for (id, message) in captures.iter().enumerate() {
        if log_requests {
            RequestLogger.process_http_message(id, message);
        }
        if let Some(detection) = listener.process(id, message) {
            println!("{}", detection.summary());
            detected_messages.push(message.clone());
            detections.push(detection);
        }
    }
    println!(
        "{} email-change request(s) detected, {} annotated.",
        detections.len(),
        history.entries().len()
    );

    if let Some(endpoint) = matches.get_one::<String>("forward_url") {
        let menu = ContextMenu::new(listener.classifier());
        let items = menu.items_for(InvocationContext::ProxyHistory, &detected_messages);
        if items.iter().any(|i| matches!(i, MenuItem::SendToWorkbench(_))) {
            match WorkbenchForwarder::new(endpoint.as_str()) {
                Ok(forwarder) => {
                    let summary = menu.send_selected(&detected_messages, &forwarder);
                    println!(
                        "Forwarded {} request(s) to {} ({} without email parameters, {} failed).",
                        summary.sent, endpoint, summary.skipped, summary.failed
                    );
                }
                Err(e) => log::error!("Cannot forward to {}: {}", endpoint, e),
            }
        }
    }

    let report_dir = Path::new(".");
    if matches.get_flag("csv_report") {
        match export_csv(&detections, report_dir) {
            Ok(name) => println!("CSV report: {}", name),
            Err(e) => log::error!("Failed to write CSV report: {}", e),
        }
    }
    if matches.get_flag("markdown_report") {
        match export_markdown(&detections, report_dir) {
            Ok(name) => println!("Markdown report: {}", name),
            Err(e) => log::error!("Failed to write Markdown report: {}", e),
        }
    }
}
