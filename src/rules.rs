use crate::error::LoadError;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;

/// One `{intent, pattern}` record from the rules file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatternRule {
    pub intent: String,
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl PatternRule {
    pub fn new(intent: &str, pattern: &str) -> Self {
        Self {
            intent: intent.to_string(),
            pattern: pattern.to_string(),
            case_insensitive: false,
        }
    }
}

/// Outcome of classifying one input. Intent and captures are present or absent together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Matched {
        intent: String,
        captures: Vec<String>,
    },
    NoMatch,
}

impl MatchResult {
    pub fn intent(&self) -> Option<&str> {
        match self {
            MatchResult::Matched { intent, .. } => Some(intent),
            MatchResult::NoMatch => None,
        }
    }

    pub fn captures(&self) -> Option<&[String]> {
        match self {
            MatchResult::Matched { captures, .. } => Some(captures),
            MatchResult::NoMatch => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    intent: String,
    pattern: String,
    regex: Regex,
}

impl CompiledRule {
    /// Compiles `rule` so that it only matches at the start of the input.
    pub fn compile(rule: &PatternRule, case_insensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!(r"\A(?:{})", rule.pattern))
            .case_insensitive(case_insensitive || rule.case_insensitive)
            .build()?;
        Ok(Self {
            intent: rule.intent.clone(),
            pattern: rule.pattern.clone(),
            regex,
        })
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of capturing groups the pattern defines.
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Captured groups in order when the pattern matches at position 0.
    /// Groups that did not take part in the match come back empty.
    pub fn match_start(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }
}

/// Ordered rule list; the first rule that matches decides the intent.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn compile(rules: &[PatternRule], case_insensitive: bool) -> Result<Self, LoadError> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                CompiledRule::compile(rule, case_insensitive).map_err(|source| {
                    LoadError::Pattern {
                        index,
                        intent: rule.intent.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Reads a JSON array of `{intent, pattern}` records and compiles it.
    pub fn load<P: AsRef<Path>>(path: P, case_insensitive: bool) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let rules: Vec<PatternRule> =
            serde_json::from_str(&content).map_err(|e| LoadError::json(path, e))?;
        let rule_set = Self::compile(&rules, case_insensitive)?;
        log::info!("Loaded {} pattern rules from '{}'", rule_set.len(), path.display());
        Ok(rule_set)
    }

    pub fn classify(&self, text: &str) -> MatchResult {
        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(captures) = rule.match_start(text) {
                log::debug!(
                    "Rule #{} ({:?}) matched intent '{}' with {} captures",
                    index,
                    rule.pattern(),
                    rule.intent,
                    captures.len()
                );
                return MatchResult::Matched {
                    intent: rule.intent.clone(),
                    captures,
                };
            }
        }
        MatchResult::NoMatch
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rule_set(rules: &[(&str, &str)]) -> RuleSet {
        let rules: Vec<PatternRule> = rules
            .iter()
            .map(|(intent, pattern)| PatternRule::new(intent, pattern))
            .collect();
        RuleSet::compile(&rules, false).unwrap()
    }

    #[test]
    fn test_classify_extracts_captures() {
        let rules = rule_set(&[("need", "I need (.*)")]);
        assert_eq!(
            rules.classify("I need coffee"),
            MatchResult::Matched {
                intent: "need".to_string(),
                captures: vec!["coffee".to_string()],
            }
        );
    }

    #[test]
    fn test_match_is_anchored_at_start_only() {
        let rules = rule_set(&[("need", "I need (.*)")]);
        assert_eq!(rules.classify("Well, I need coffee"), MatchResult::NoMatch);

        // A prefix match is enough, the rest of the input is not required to match.
        let rules = rule_set(&[("greeting", "hello")]);
        assert_eq!(rules.classify("hello world").intent(), Some("greeting"));
    }

    #[test]
    fn test_first_match_wins() {
        let rules = rule_set(&[("short", "I (.*)"), ("need", "I need (.*)")]);
        let result = rules.classify("I need coffee");
        assert_eq!(result.intent(), Some("short"));
        assert_eq!(result.captures(), Some(&["need coffee".to_string()][..]));
    }

    #[test]
    fn test_no_match_has_neither_intent_nor_captures() {
        let rules = rule_set(&[("need", "I need (.*)")]);
        let result = rules.classify("something else");
        assert_eq!(result, MatchResult::NoMatch);
        assert!(result.intent().is_none());
        assert!(result.captures().is_none());
    }

    #[test]
    fn test_case_sensitive_by_default() {
        let rules = rule_set(&[("greeting", "(hi|hello)")]);
        assert_eq!(rules.classify("Hello, Alain"), MatchResult::NoMatch);
    }

    #[test]
    fn test_case_insensitive_alternation_group_is_a_capture() {
        let rules = vec![PatternRule {
            intent: "greeting".to_string(),
            pattern: "(hi|hello)".to_string(),
            case_insensitive: true,
        }];
        let rules = RuleSet::compile(&rules, false).unwrap();
        assert_eq!(
            rules.classify("Hello, Alain"),
            MatchResult::Matched {
                intent: "greeting".to_string(),
                captures: vec!["Hello".to_string()],
            }
        );

        // The global option has the same effect.
        let global = RuleSet::compile(&[PatternRule::new("greeting", "(hi|hello)")], true).unwrap();
        assert_eq!(global.classify("HI there").intent(), Some("greeting"));
    }

    #[test]
    fn test_pattern_without_groups_yields_empty_captures() {
        let rules = rule_set(&[("areyou", "Are you")]);
        assert_eq!(rules.classify("Are you a robot?").captures(), Some(&[][..]));
    }

    #[test]
    fn test_non_participating_group_is_empty() {
        let rules = rule_set(&[("pick", "(a)|(b)")]);
        assert_eq!(
            rules.classify("b").captures(),
            Some(&["".to_string(), "b".to_string()][..])
        );
    }

    #[test]
    fn test_empty_input() {
        let rules = rule_set(&[("need", "I need (.*)")]);
        assert_eq!(rules.classify(""), MatchResult::NoMatch);

        let rules = rule_set(&[("anything", ".*")]);
        assert_eq!(rules.classify("").intent(), Some("anything"));
    }

    #[test]
    fn test_alternation_does_not_escape_anchor() {
        let rules = rule_set(&[("either", "foo|bar")]);
        assert_eq!(rules.classify("xbar"), MatchResult::NoMatch);
        assert_eq!(rules.classify("bar").intent(), Some("either"));
    }

    #[test]
    fn test_capture_count() {
        let rules = rule_set(&[("two", "(a)(b)"), ("none", "c")]);
        let counts: Vec<usize> = rules.iter().map(|r| r.capture_count()).collect();
        assert_eq!(counts, vec![2, 0]);
    }

    #[test]
    fn test_malformed_pattern_fails_at_compile() {
        let rules = vec![
            PatternRule::new("ok", "fine"),
            PatternRule::new("broken", "I need (.*"),
        ];
        match RuleSet::compile(&rules, false) {
            Err(LoadError::Pattern { index, intent, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(intent, "broken");
            }
            other => panic!("expected pattern error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_preserves_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"intent": "b", "pattern": "x"}},
                {{"intent": "a", "pattern": "x(.*)", "case_insensitive": true}}
            ]"#
        )
        .unwrap();

        let rules = RuleSet::load(file.path(), false).unwrap();
        let intents: Vec<&str> = rules.iter().map(|r| r.intent()).collect();
        assert_eq!(intents, vec!["b", "a"]);
        assert_eq!(rules.classify("xyz").intent(), Some("b"));
    }

    #[test]
    fn test_load_rejects_wrong_shape() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"need": "I need (.*)"}}"#).unwrap();
        assert!(matches!(
            RuleSet::load(file.path(), false),
            Err(LoadError::Json { .. })
        ));
    }

    #[test]
    fn test_load_rejects_misspelled_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"intent": "g", "pattern": "hello", "case_insensitve": true}}]"#
        )
        .unwrap();
        match RuleSet::load(file.path(), false) {
            Err(LoadError::Json { source, .. }) => {
                assert!(source.to_string().contains("case_insensitve"), "{}", source);
            }
            other => panic!("expected json error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            RuleSet::load("/nonexistent/rules.json", false),
            Err(LoadError::Io { .. })
        ));
    }
}
