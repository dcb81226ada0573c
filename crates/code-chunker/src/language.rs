use std::path::Path;

/// Supported programming language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Swift,
    Kotlin,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" | "pyw" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "cs" => Language::CSharp,
            "rb" => Language::Ruby,
            "swift" => Language::Swift,
            "kt" | "kts" => Language::Kotlin,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Unknown => "unknown",
        }
    }

    /// Languages whose files may serve each other as cross-file context.
    /// JavaScript and TypeScript share one family, C and C++ another.
    pub fn family(self) -> &'static str {
        match self {
            Language::JavaScript | Language::TypeScript => "ecmascript",
            Language::C | Language::Cpp => "c-family",
            other => other.as_str(),
        }
    }

    /// Whether two languages can exchange cross-file context
    pub fn same_family(self, other: Language) -> bool {
        self != Language::Unknown && self.family() == other.family()
    }

    /// Check if cross-file BM25 context is offered for this language
    pub fn supports_cross_file(self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Check if test-to-source (focal file) resolution is offered
    pub fn supports_focal_file(self) -> bool {
        matches!(
            self,
            Language::Java | Language::Python | Language::JavaScript | Language::TypeScript
        )
    }

    /// Check whether `path` follows this language's test-file naming conventions
    pub fn is_test_path(self, path: &str) -> bool {
        let normalized = path.replace('\\', "/");
        let Some((stem, _ext)) = split_file_name(&normalized) else {
            return false;
        };

        match self {
            Language::Java => {
                normalized.contains("/src/test/")
                    || stem.ends_with("Test")
                    || stem.ends_with("Tests")
                    || strip_java_test_prefix(stem).is_some()
            }
            Language::Python => stem.starts_with("test_") || stem.ends_with("_test"),
            Language::JavaScript | Language::TypeScript => {
                stem.ends_with(".test") || stem.ends_with(".spec")
            }
            Language::Go => stem.ends_with("_test"),
            Language::Kotlin => stem.ends_with("Test") || stem.ends_with("Tests"),
            Language::Ruby => stem.ends_with("_spec") || stem.ends_with("_test"),
            _ => false,
        }
    }

    /// File names the source file of a test file is expected to carry.
    ///
    /// Returns an empty list when `test_path` is not a conventional test name.
    pub fn focal_file_names(self, test_path: &str) -> Vec<String> {
        let normalized = test_path.replace('\\', "/");
        let Some((stem, ext)) = split_file_name(&normalized) else {
            return Vec::new();
        };

        let mut stems = Vec::new();
        match self {
            Language::Java => {
                if let Some(base) = stem.strip_suffix("Tests") {
                    stems.push(base);
                } else if let Some(base) = stem.strip_suffix("Test") {
                    stems.push(base);
                }
                if let Some(base) = strip_java_test_prefix(stem) {
                    stems.push(base);
                }
            }
            Language::Python => {
                if let Some(base) = stem.strip_prefix("test_") {
                    stems.push(base);
                }
                if let Some(base) = stem.strip_suffix("_test") {
                    stems.push(base);
                }
            }
            Language::JavaScript | Language::TypeScript => {
                if let Some(base) = stem
                    .strip_suffix(".test")
                    .or_else(|| stem.strip_suffix(".spec"))
                {
                    stems.push(base);
                }
            }
            _ => {}
        }

        stems
            .into_iter()
            .filter(|base| !base.is_empty())
            .map(|base| format!("{base}.{ext}"))
            .collect()
    }
}

/// Check whether `path` is a test file for the language its extension implies
pub fn is_test_file(path: &str) -> bool {
    Language::from_path(path).is_test_path(path)
}

fn split_file_name(path: &str) -> Option<(&str, &str)> {
    let file_name = path.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some((stem, ext))
}

/// `TestFoo` → `Foo`, but `Testing` and `Test` stay as they are.
fn strip_java_test_prefix(stem: &str) -> Option<&str> {
    let rest = stem.strip_prefix("Test")?;
    rest.chars()
        .next()
        .filter(|c| c.is_ascii_uppercase())
        .map(|_| rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("PY"), Language::Python);
        assert_eq!(Language::from_extension("jsx"), Language::JavaScript);
        assert_eq!(Language::from_extension("tsx"), Language::TypeScript);
        assert_eq!(Language::from_extension("unknown"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("src/A.ts"), Language::TypeScript);
        assert_eq!(Language::from_path("src/main.py"), Language::Python);
        assert_eq!(Language::from_path("no_extension"), Language::Unknown);
    }

    #[test]
    fn test_families() {
        assert!(Language::TypeScript.same_family(Language::JavaScript));
        assert!(Language::C.same_family(Language::Cpp));
        assert!(!Language::Java.same_family(Language::Kotlin));
        assert!(!Language::Unknown.same_family(Language::Unknown));
    }

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file("src/test/java/com/acme/CalculatorTest.java"));
        assert!(is_test_file("TestCalculator.java"));
        assert!(!is_test_file("Testing.java"));
        assert!(!is_test_file("src/main/java/Calculator.java"));
        assert!(is_test_file("tests/test_calc.py"));
        assert!(is_test_file("calc_test.py"));
        assert!(!is_test_file("calc.py"));
        assert!(is_test_file("src/calc.test.ts"));
        assert!(is_test_file("src/calc.spec.jsx"));
        assert!(!is_test_file("src/calc.ts"));
        assert!(is_test_file("pkg/calc_test.go"));
        assert!(!is_test_file("README"));
    }

    #[test]
    fn test_focal_file_names() {
        assert_eq!(
            Language::Java.focal_file_names("src/test/CalculatorTest.java"),
            vec!["Calculator.java".to_string()]
        );
        assert_eq!(
            Language::Java.focal_file_names("TestCalculator.java"),
            vec!["Calculator.java".to_string()]
        );
        assert_eq!(
            Language::Python.focal_file_names("tests/test_calc.py"),
            vec!["calc.py".to_string()]
        );
        assert_eq!(
            Language::TypeScript.focal_file_names("src/calc.spec.tsx"),
            vec!["calc.tsx".to_string()]
        );
        assert!(Language::Python.focal_file_names("calc.py").is_empty());
        assert!(Language::Go.focal_file_names("calc_test.go").is_empty());
    }
}
