//! Exclusion rules applied while walking a source tree.
//!
//! A candidate is excluded iff any rule matches it. Directory candidates are
//! bare names; file candidates are `/`-separated paths relative to the source
//! root. All matching is case-insensitive.

use std::sync::LazyLock;

use globset::{GlobBuilder, GlobMatcher};
use regex::{Regex, RegexBuilder};

use crate::spec::{EnumExcludePatternMode, SpecTransferOptions, TransferError};

/// Built-in rules, matched as case-insensitive substrings.
pub const TUP_EXCLUDE_RULES_DEFAULT: [&str; 11] = [
    "node_modules",
    ".git",
    "build",
    "buildmin_new",
    "__pycache__",
    ".pyc",
    ".DS_Store",
    "Thumbs.db",
    ".vscode/settings.json",
    "npm-debug.log",
    "yarn-error.log",
];

static SPEC_EXCLUDE_RULES_DEFAULT: LazyLock<SpecExcludeRules> =
    LazyLock::new(SpecExcludeRules::default);

/// Check `path` against the built-in rules only.
pub fn is_excluded(path: &str) -> bool {
    SPEC_EXCLUDE_RULES_DEFAULT.is_excluded(path)
}

#[derive(Debug, Clone)]
enum TypeExcludePatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

/// Compiled exclusion rules for one traversal.
#[derive(Debug, Clone)]
pub struct SpecExcludeRules {
    rules_literal: Vec<String>,
    patterns_extra: Option<TypeExcludePatternSeq>,
}

impl Default for SpecExcludeRules {
    fn default() -> Self {
        Self {
            rules_literal: TUP_EXCLUDE_RULES_DEFAULT
                .iter()
                .map(|rule| rule.to_lowercase())
                .collect(),
            patterns_extra: None,
        }
    }
}

impl SpecExcludeRules {
    /// Built-in rules plus the extra patterns carried by `spec_tx_options`.
    pub fn from_options(spec_tx_options: &SpecTransferOptions) -> Result<Self, TransferError> {
        Ok(Self {
            patterns_extra: _compile(
                spec_tx_options.patterns_exclude_extra.as_deref(),
                spec_tx_options.rule_pattern,
            )?,
            ..Self::default()
        })
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        let c_path_lower = path.to_lowercase();
        if self
            .rules_literal
            .iter()
            .any(|rule| c_path_lower.contains(rule.as_str()))
        {
            return true;
        }

        match &self.patterns_extra {
            None => false,
            Some(TypeExcludePatternSeq::Literal(v)) => {
                v.iter().any(|p| c_path_lower.contains(p.as_str()))
            }
            Some(TypeExcludePatternSeq::Glob(v)) => v.iter().any(|p| p.is_match(path)),
            Some(TypeExcludePatternSeq::Regex(v)) => v.iter().any(|p| p.is_match(path)),
        }
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumExcludePatternMode,
) -> Result<Option<TypeExcludePatternSeq>, TransferError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumExcludePatternMode::Literal => Ok(Some(TypeExcludePatternSeq::Literal(
            patterns.iter().map(|p| p.to_lowercase()).collect(),
        ))),
        EnumExcludePatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = GlobBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| TransferError::InvalidPattern(e.to_string()))?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeExcludePatternSeq::Glob(l_glob)))
        }
        EnumExcludePatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| TransferError::InvalidPattern(e.to_string()))?;
                l_regex.push(regex);
            }
            Ok(Some(TypeExcludePatternSeq::Regex(l_regex)))
        }
    }
}
