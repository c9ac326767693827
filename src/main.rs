use clap::{Arg, ArgMatches, Command};
use log::LevelFilter;
use phonecheck::checker::{CheckerStats, ProviderRole};
use phonecheck::{
    AggregatedVerdict, Config, PhoneChecker, RiskLevel, SearchFilters, SearchResults, UserReport,
    VerdictType,
};
use serde::Serialize;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("phonecheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phone number risk checker for French numbers")
        .long_about("phonecheck - merges several reputation sources into one verdict:\n\
                    • Curated local registry of reported numbers\n\
                    • External reputation providers queried concurrently\n\
                    • Caller-reputation heuristic and number pattern analysis\n\
                    • Report fan-out to every configured destination")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phonecheck.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .value_name("NUMBER")
                .help("Check a phone number against every source")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("NUMBER")
                .help("Report a phone number to every destination")
                .requires_all(["report-type", "description"])
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("report-type")
                .long("report-type")
                .value_name("TYPE")
                .help("Report type: scam, spam, suspicious, safe")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("description")
                .long("description")
                .value_name("TEXT")
                .help("What happened during the call")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .value_name("CATEGORY")
                .help("Category for --report, or category filter for --search")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("search")
                .long("search")
                .value_name("QUERY")
                .help("Search reported numbers by number, description or category")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("type")
                .long("type")
                .value_name("TYPE")
                .help("Only show search results of this type")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("risk-level")
                .long("risk-level")
                .value_name("LEVEL")
                .help("Only show search results at this risk level")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("no-external")
                .long("no-external")
                .help("Do not query external providers during search")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show registry statistics")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-providers")
                .long("list-providers")
                .help("List configured providers and report destinations")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-source details")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("/etc/phonecheck.yaml");
    let config_found = std::path::Path::new(config_path).exists();
    let config = if config_found {
        match Config::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e:#}");
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Initialize logger based on verbose flag, then the configured level
    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config.logging.level_filter()
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    if !config_found {
        log::warn!("Configuration file '{config_path}' not found, using default configuration");
    }

    let checker = match PhoneChecker::from_config(&config) {
        Ok(checker) => checker,
        Err(e) => {
            eprintln!("❌ Failed to start phone checker: {e:#}");
            process::exit(1);
        }
    };
    let json = matches.get_flag("json");

    if let Some(number) = matches.get_one::<String>("check") {
        match checker.check_phone_number(number).await {
            Ok(verdict) => emit(json, &verdict, print_verdict),
            Err(e) => {
                eprintln!("❌ {e}");
                process::exit(1);
            }
        }
        return;
    }

    if let Some(number) = matches.get_one::<String>("report") {
        report_number(&checker, &matches, number, json).await;
        return;
    }

    if let Some(query) = matches.get_one::<String>("search") {
        let filters = match search_filters(&matches) {
            Ok(filters) => filters,
            Err(e) => {
                eprintln!("❌ {e}");
                process::exit(1);
            }
        };
        let results = checker.search_reports(query, &filters).await;
        emit(json, &results, print_search_results);
        return;
    }

    if matches.get_flag("stats") {
        match checker.statistics().await {
            Ok(stats) => emit(json, &stats, print_stats),
            Err(e) => {
                eprintln!("❌ Failed to get statistics: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("list-providers") {
        let status = checker.provider_status();
        if json {
            print_json(&status);
            return;
        }
        println!("📋 Configured Providers");
        println!("═══════════════════════════════════════");
        for provider in &status {
            let role = match provider.role {
                ProviderRole::External => "external provider",
                ProviderRole::CallerReputation => "caller reputation",
            };
            let kind = if provider.simulated { "simulated" } else { "live" };
            println!("  ✅ {} ({role}, {kind})", provider.name);
        }
        println!();
        println!("📮 Report destinations:");
        for destination in checker.report_destinations() {
            println!("  • {destination}");
        }
        return;
    }

    eprintln!("Nothing to do. Use --check, --report, --search, --stats or --list-providers.");
    process::exit(2);
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, pretty: fn(&T)) {
    if json {
        print_json(value);
    } else {
        pretty(value);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("❌ Failed to serialize output: {e}");
            process::exit(1);
        }
    }
}

fn search_filters(matches: &ArgMatches) -> Result<SearchFilters, String> {
    let verdict_type = match matches.get_one::<String>("type") {
        Some(value) => {
            Some(VerdictType::parse(value).ok_or_else(|| format!("Unknown type: {value}"))?)
        }
        None => None,
    };
    let risk_level = match matches.get_one::<String>("risk-level") {
        Some(value) => {
            Some(RiskLevel::parse(value).ok_or_else(|| format!("Unknown risk level: {value}"))?)
        }
        None => None,
    };

    Ok(SearchFilters {
        verdict_type,
        category: matches.get_one::<String>("category").cloned(),
        risk_level,
        include_external: !matches.get_flag("no-external"),
    })
}

async fn report_number(checker: &PhoneChecker, matches: &ArgMatches, number: &str, json: bool) {
    let raw_type = matches
        .get_one::<String>("report-type")
        .map(String::as_str)
        .unwrap_or_default();
    let Some(verdict_type) = VerdictType::parse(raw_type) else {
        eprintln!("❌ Unknown report type: {raw_type}");
        process::exit(1);
    };

    let report = UserReport {
        verdict_type,
        description: matches
            .get_one::<String>("description")
            .cloned()
            .unwrap_or_default(),
        category: matches.get_one::<String>("category").cloned(),
    };

    let dispatch = match checker.report_number(number, report).await {
        Ok(dispatch) => dispatch,
        Err(e) => {
            eprintln!("❌ {e}");
            process::exit(1);
        }
    };

    if json {
        print_json(&dispatch);
    } else {
        let headline = if dispatch.success { "✅ Report accepted" } else { "❌ Report not accepted" };
        println!("{headline} ({})", dispatch.report_id);
        for outcome in &dispatch.outcomes {
            match (&outcome.report_id, &outcome.error) {
                (Some(id), _) => println!("  ├─ {}: ✅ {id}", outcome.destination),
                (None, Some(error)) => println!("  ├─ {}: ❌ {error}", outcome.destination),
                (None, None) => println!("  ├─ {}: ❌", outcome.destination),
            }
        }
    }

    if !dispatch.success {
        process::exit(1);
    }
}

fn print_verdict(verdict: &AggregatedVerdict) {
    println!(
        "{} {} - {}",
        verdict.risk_level.icon(),
        verdict.phone_number,
        verdict.verdict_type.as_str().to_uppercase()
    );
    println!("═══════════════════════════════════════");
    println!("  Risk level:   {}", verdict.risk_level);
    println!("  Confidence:   {}%", verdict.confidence);
    println!("  Reports:      {}", verdict.report_count);
    if let Some(date) = verdict.last_report_date {
        println!("  Last report:  {}", date.format("%Y-%m-%d"));
    }
    println!("  Category:     {}", verdict.category_label);
    println!("  Description:  {}", verdict.description);
    println!("  Decided by:   {}", verdict.source);
    if let Some(details) = &verdict.caller_details {
        println!(
            "  Caller:       {} ({}, {}, {})",
            details.display_name, details.carrier, details.city, details.line_type
        );
    }
    if let Some(pattern) = &verdict.pattern_assessment {
        println!(
            "  Pattern:      {} (risk {}, confidence {}%)",
            pattern.description, pattern.risk_level, pattern.confidence
        );
    }
    println!();
    println!("💡 {}", verdict.reasoning);
}

fn print_search_results(results: &SearchResults) {
    println!(
        "🔎 {} result(s) for '{}' ({} local, {} external)",
        results.hits.len(),
        results.query,
        results.local_count,
        results.external_count
    );
    if results.hits.is_empty() {
        println!("📭 Nothing found");
        return;
    }
    println!("┌──────────────────┬────────────┬────────┬─────────┬──────────────────────────────┐");
    println!("│ Number           │ Type       │ Risk   │ Reports │ Category                     │");
    println!("├──────────────────┼────────────┼────────┼─────────┼──────────────────────────────┤");
    for hit in &results.hits {
        println!(
            "│ {:<16} │ {:<10} │ {:<6} │ {:>7} │ {:<28} │",
            hit.phone_number,
            hit.verdict_type,
            hit.risk_level,
            hit.report_count,
            truncate_string(&hit.category_label, 28)
        );
    }
    println!("└──────────────────┴────────────┴────────┴─────────┴──────────────────────────────┘");
}

fn print_stats(stats: &CheckerStats) {
    let registry = &stats.registry;
    println!("📊 phonecheck Statistics");
    println!("═══════════════════════════════════════");
    println!();
    println!("📈 Registry:");
    println!("  Entries: {}", registry.total_entries);
    println!("  Total Reports: {}", registry.total_reports);
    println!("  ├─ Scam: {}", registry.scam_reports);
    println!("  ├─ Spam: {}", registry.spam_reports);
    println!("  └─ Verified safe numbers: {}", registry.verified_safe);
    println!();
    if !registry.top_categories.is_empty() {
        println!("🎯 Top categories:");
        for category in &registry.top_categories {
            println!(
                "  • {:<32} {:>5} ({:.1}%)",
                truncate_string(&category.name, 32),
                category.count,
                category.percentage
            );
        }
        println!();
    }
    println!(
        "  Started: {}",
        stats.runtime.start_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
