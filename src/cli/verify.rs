use crate::models::PipelinesConfig;
use crate::validator::ConsistencyChecker;
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, pipelines_path: &Path, repair: bool) -> Result<()> {
    let config = PipelinesConfig::load(pipelines_path)?;
    let graph = config.build_graph()?;
    let checker = ConsistencyChecker::new(&config.pipelines, &graph);

    println!("{}", "🔍 Verifying pipeline consistency...".cyan());

    let report = if repair {
        let outcome = checker.repair(root)?;
        for entry in &outcome.repaired {
            println!(
                "   🔧 {} reverted to '{}'",
                entry.path.display(),
                entry.reverted_to.as_deref().unwrap_or("seed")
            );
        }
        for failure in &outcome.failures {
            eprintln!(
                "{}",
                format!("❌ Repair failed for {}: {}", failure.path.display(), failure.message)
                    .red()
            );
        }
        outcome.report
    } else {
        checker.check(root)?
    };

    println!();
    for mismatch in &report.mismatches {
        println!("{}", format!("❌ {}", mismatch.path.display()).red());
        println!("   Pipeline: {}", mismatch.pipeline);
        println!("   Expected: {}", mismatch.expected.join(", "));
        println!(
            "   Actual:   {}",
            if mismatch.actual.is_empty() {
                "(none)".to_string()
            } else {
                mismatch.actual.join(", ")
            }
        );
        println!("   Missing:  {}", mismatch.missing.join(", ").bold());
    }

    for (path, pipeline) in &report.unknown_pipelines {
        eprintln!(
            "{}",
            format!("⚠️  Unknown pipeline '{}' at {}", pipeline, path.display()).yellow()
        );
    }

    for error in &report.errors {
        eprintln!(
            "{}",
            format!("⚠️  Skipping malformed folder {}: {}", error.path.display(), error.message)
                .yellow()
        );
    }

    println!(
        "Checked: {}   Passed: {}   Drifted: {}",
        report.checked,
        report.passed,
        report.mismatches.len()
    );

    if report.is_clean() {
        println!("{}", "✅ All articles consistent".green());
    } else if !repair {
        println!(
            "{}",
            "Run with --repair to revert drifted articles.".yellow()
        );
    }

    Ok(())
}
