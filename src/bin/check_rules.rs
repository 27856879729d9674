//! Cross-checks a rules file against a responses file before deployment.
//!
//! Usage: `check_rules <rules.json> <responses.json> [--ignore-case]`

use anyhow::{bail, Context, Result};
use std::path::Path;

#[allow(dead_code)]
#[path = "../error.rs"]
mod error;
#[allow(dead_code)]
#[path = "../responses.rs"]
mod responses;
#[allow(dead_code)]
#[path = "../rules.rs"]
mod rules;
#[allow(dead_code)]
#[path = "../template.rs"]
mod template;
#[allow(dead_code)]
#[path = "../validate.rs"]
mod validate;

use responses::ResponseSet;
use rules::RuleSet;

/// Loads both files and logs every finding. Returns the number of fatal findings.
fn run(rules_path: &Path, responses_path: &Path, case_insensitive: bool) -> Result<usize> {
    let rules = RuleSet::load(rules_path, case_insensitive)
        .with_context(|| format!("Cannot load rules from '{}'", rules_path.display()))?;
    let responses = ResponseSet::load(responses_path)
        .with_context(|| format!("Cannot load responses from '{}'", responses_path.display()))?;

    let findings = validate::check(&rules, &responses);
    let mut fatal = 0;
    for finding in &findings {
        if finding.is_fatal() {
            fatal += 1;
            log::error!("{}", finding);
        } else {
            log::warn!("{}", finding);
        }
    }

    log::info!(
        "Checked {} rules against {} intents: {} findings, {} fatal",
        rules.len(),
        responses.len(),
        findings.len(),
        fatal
    );
    Ok(fatal)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let case_insensitive = args.iter().any(|a| a == "--ignore-case");
    let paths: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let [rules_path, responses_path] = paths.as_slice() else {
        bail!("usage: check_rules <rules.json> <responses.json> [--ignore-case]");
    };

    let fatal = run(Path::new(rules_path), Path::new(responses_path), case_insensitive)?;
    if fatal > 0 {
        bail!("{} templates can never be filled by their rules", fatal);
    }
    Ok(())
}
