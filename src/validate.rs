use crate::responses::ResponseSet;
use crate::rules::RuleSet;
use std::collections::BTreeSet;
use std::fmt;

/// An authoring problem between the rules file and the responses file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A rule routes to an intent with no responses entry.
    MissingResponses { rule: usize, intent: String },
    /// The intent exists but lists no templates.
    EmptyResponses { intent: String },
    /// A template needs more captures than a rule routing to it provides.
    ArityExceedsCaptures {
        rule: usize,
        intent: String,
        template: String,
        required: usize,
        available: usize,
    },
    /// No rule routes to this intent.
    UnusedResponses { intent: String },
}

impl Finding {
    /// Fatal findings turn into runtime failures when the rule fires.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Finding::ArityExceedsCaptures { .. })
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingResponses { rule, intent } => write!(
                f,
                "rule #{} routes to intent '{}' which has no responses",
                rule, intent
            ),
            Finding::EmptyResponses { intent } => {
                write!(f, "intent '{}' has an empty message list", intent)
            }
            Finding::ArityExceedsCaptures {
                rule,
                intent,
                template,
                required,
                available,
            } => write!(
                f,
                "template {:?} of intent '{}' needs {} captures but rule #{} only has {}",
                template, intent, required, rule, available
            ),
            Finding::UnusedResponses { intent } => {
                write!(f, "intent '{}' has responses but no rule routes to it", intent)
            }
        }
    }
}

/// Cross-checks rules against responses.
pub fn check(rules: &RuleSet, responses: &ResponseSet) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut empty_reported = BTreeSet::new();

    for (index, rule) in rules.iter().enumerate() {
        let intent = rule.intent();
        if !responses.contains(intent) {
            findings.push(Finding::MissingResponses {
                rule: index,
                intent: intent.to_string(),
            });
            continue;
        }

        let Some(templates) = responses.templates(intent) else {
            if empty_reported.insert(intent.to_string()) {
                findings.push(Finding::EmptyResponses {
                    intent: intent.to_string(),
                });
            }
            continue;
        };

        // Without capture groups templates are sent verbatim.
        let available = rule.capture_count();
        if available == 0 {
            continue;
        }
        for template in templates {
            if template.arity() > available {
                findings.push(Finding::ArityExceedsCaptures {
                    rule: index,
                    intent: intent.to_string(),
                    template: template.source().to_string(),
                    required: template.arity(),
                    available,
                });
            }
        }
    }

    let routed: BTreeSet<&str> = rules.iter().map(|rule| rule.intent()).collect();
    let mut unused: Vec<&str> = responses
        .intents()
        .filter(|intent| !routed.contains(intent))
        .collect();
    unused.sort_unstable();
    findings.extend(unused.into_iter().map(|intent| Finding::UnusedResponses {
        intent: intent.to_string(),
    }));

    findings
}
