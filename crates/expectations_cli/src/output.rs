use anyhow::Result;
use colored::*;
use expectations_core::{Suite, ValidationResult};
use serde_json::json;

pub fn print_validation_result(result: &ValidationResult, format: &str) -> Result<()> {
    match format {
        "json" => print_json_result(result),
        _ => {
            print_text_result(result);
            Ok(())
        }
    }
}

fn print_text_result(result: &ValidationResult) {
    println!("\n{}", "═".repeat(60));
    println!("{}", format!("  VALIDATION REPORT: {}", result.suite_name).bold());
    println!("{}", "═".repeat(60));

    if result.success {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !result.failed_rules.is_empty() {
        println!("\n{}", "Failed rules:".red().bold());
        for (i, failure) in result.failed_rules.iter().enumerate() {
            let target = if failure.target_columns.is_empty() {
                "table".to_string()
            } else {
                failure.target_columns.join(", ")
            };
            println!(
                "  {}. {} [{}] on {}",
                i + 1,
                failure.rule_name.red(),
                failure.rule_kind,
                target
            );
            println!("     {}", failure.observed);
        }
    } else if !result.success {
        println!(
            "\n{}",
            "Data contains missing or non-finite values".red()
        );
    }

    let stats = &result.statistics;
    println!("\n{}", "Summary:".bold());
    println!("  Rules evaluated: {}", stats.evaluated);
    println!("  Successful:      {}", stats.successful);
    println!("  Unsuccessful:    {}", stats.unsuccessful);
    println!("  Success rate:    {:.1}%", stats.success_fraction * 100.0);
    println!("{}", "═".repeat(60));
}

fn print_json_result(result: &ValidationResult) -> Result<()> {
    let output = json!({
        "suite": result.suite_name,
        "success": result.success,
        "statistics": result.statistics,
        "failed_rules": result.failed_rules,
        "summary": result.to_string(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_suite(suite: &Suite, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(suite)?);
        return Ok(());
    }

    println!("\n{} {}", "Suite:".bold(), suite.name());
    if let Some(description) = suite.description() {
        println!("  {}", description);
    }
    println!();
    for (i, rule) in suite.rules().iter().enumerate() {
        let mostly = if rule.tolerance < 1.0 {
            format!(" (mostly {})", rule.tolerance).yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:>2}. {}{} {}",
            i + 1,
            rule.name.bold(),
            mostly,
            rule.expectation.parameters()
        );
    }
    println!("\n  {} rules", suite.len());
    Ok(())
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
