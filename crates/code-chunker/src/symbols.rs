use crate::language::Language;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const MIN_NAME_LEN: usize = 3;

const CALL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "typeof", "super", "new",
    "elif", "print", "assert", "assertEquals", "assertTrue", "assertFalse", "expect", "describe",
    "it", "test", "require", "import", "constructor",
];

struct PatternSet {
    regexes: Vec<Regex>,
}

/// Invalid patterns are logged and left out of the set.
fn compile(patterns: &[&str]) -> PatternSet {
    let regexes = patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(err) => {
                log::warn!("Invalid symbol pattern {pattern}: {err}");
                None
            }
        })
        .collect();
    PatternSet { regexes }
}

fn patterns_for(language: Language) -> Option<&'static PatternSet> {
    static JAVA: OnceLock<PatternSet> = OnceLock::new();
    static PYTHON: OnceLock<PatternSet> = OnceLock::new();
    static ECMASCRIPT: OnceLock<PatternSet> = OnceLock::new();

    match language {
        Language::Java => Some(JAVA.get_or_init(|| {
            compile(&[
                r"(?:public|private|protected)\s+(?:static\s+)?(?:final\s+)?(?:[\w<>\[\],]+\s+)?(\w+)\s*\(",
                r"(?m)^\s*(?:(?:public|abstract|final)\s+)*(?:class|interface|enum)\s+(\w+)",
            ])
        })),
        Language::Python => Some(PYTHON.get_or_init(|| {
            compile(&[
                r"def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(",
                r"(?m)^\s*class\s+(\w+)\s*[:(]",
            ])
        })),
        Language::JavaScript | Language::TypeScript => Some(ECMASCRIPT.get_or_init(|| {
            compile(&[
                r"function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(",
                r"(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*=>|[A-Za-z_$][\w$]*\s*=>)",
                r"class\s+([A-Za-z_$][\w$]*)",
            ])
        })),
        _ => None,
    }
}

fn call_pattern() -> Option<&'static Regex> {
    static CALL: OnceLock<PatternSet> = OnceLock::new();
    CALL.get_or_init(|| compile(&[r"([A-Za-z_$][\w$]*)\s*\("]))
        .regexes
        .first()
}

/// Function and class names declared in `content`, in order of appearance.
pub fn extract_symbol_names(content: &str, language: Language) -> Vec<String> {
    let Some(patterns) = patterns_for(language) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for re in &patterns.regexes {
        for caps in re.captures_iter(content) {
            let Some(name) = caps.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if name.len() >= MIN_NAME_LEN && seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }
    }
    names
}

/// Declared names plus the identifiers a file calls. Test files often
/// declare nothing relevant and only call into the code under test.
pub fn extract_referenced_names(content: &str, language: Language) -> Vec<String> {
    let mut names = extract_symbol_names(content, language);
    let Some(call) = call_pattern() else {
        return names;
    };
    let mut seen: HashSet<String> = names.iter().cloned().collect();
    for caps in call.captures_iter(content) {
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if name.len() < MIN_NAME_LEN || CALL_KEYWORDS.contains(&name) {
            continue;
        }
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
    names
}

/// Number of `candidate_names` that occur, case-insensitively, inside any of `test_names`.
pub fn count_name_overlap(candidate_names: &[String], test_names: &[String]) -> usize {
    let test_names: Vec<String> = test_names.iter().map(|n| n.to_lowercase()).collect();
    candidate_names
        .iter()
        .map(|name| name.to_lowercase())
        .filter(|name| test_names.iter().any(|test| test.contains(name.as_str())))
        .count()
}
