#![allow(clippy::uninlined_format_args)]

use phonecheck::config::Config;
use phonecheck::{PhoneChecker, SearchFilters, UserReport, VerdictType};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing verdict scenarios...");

    // Optional config path as first argument, defaults otherwise
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "phonecheck.yaml".to_string());
    let config = Config::load_or_default(&config_path)?;
    let checker = PhoneChecker::from_config(&config)?;

    let scenarios = [
        ("+33612345678", "registry scam, confirmed by ScamAlert"),
        ("06 12 34 56 78", "same number in national notation"),
        ("+33123456787", "verified safe registry entry"),
        ("0611100000", "unknown number with a suspicious digit run"),
        ("0811223344", "unknown premium-rate number"),
        ("0623456782", "unknown mobile number"),
        ("12345", "malformed input"),
    ];

    for (i, (number, label)) in scenarios.iter().enumerate() {
        println!("\n=== Test Case {}: {} ({}) ===", i + 1, number, label);
        match checker.check_phone_number(number).await {
            Ok(verdict) => {
                println!("Verdict: {:?}", verdict.verdict_type);
                println!("Risk level: {:?}", verdict.risk_level);
                println!("Confidence: {}", verdict.confidence);
                println!("Reports: {}", verdict.report_count);
                println!("Decided by: {}", verdict.source);
                println!("Contributing: {:?}", verdict.contributing_sources);
                if let Some(pattern) = &verdict.pattern_assessment {
                    println!("Pattern: {} ({:?})", pattern.description, pattern.risk_level);
                }
                println!("Reasoning: {}", verdict.reasoning);
            }
            Err(e) => println!("Rejected: {}", e),
        }
    }

    println!("\n=== Report fan-out ===");
    let dispatch = checker
        .report_number(
            "0611223344",
            UserReport {
                verdict_type: VerdictType::Scam,
                description: "Fake parcel delivery fee".to_string(),
                category: Some("utility".to_string()),
            },
        )
        .await?;
    println!("Dispatch {} success={}", dispatch.report_id, dispatch.success);
    for outcome in &dispatch.outcomes {
        println!("  {} -> {:?} {:?}", outcome.destination, outcome.report_id, outcome.error);
    }

    println!("\n=== Search 'scam' ===");
    let results = checker.search_reports("scam", &SearchFilters::default()).await;
    for hit in &results.hits {
        println!("  {} {:?} {} reports", hit.phone_number, hit.verdict_type, hit.report_count);
    }

    let stats = checker.statistics().await?;
    println!("\nChecks performed: {}", stats.runtime.checks_performed);
    println!("Verdicts: {:?}", stats.runtime.verdicts);

    Ok(())
}
