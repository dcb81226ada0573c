//! Test file → source file ("focal file") resolution.

use crate::deadline::{Deadline, DeadlineExceeded};
use crate::workspace::Workspace;
use nextedit_code_chunker::{
    count_name_overlap, extract_referenced_names, extract_symbol_names, Language,
};
use nextedit_protocol::{ContextItem, ContextKind};
use std::collections::HashSet;

/// A resolved focal file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocalMatch {
    pub path: String,
    pub content: String,
    pub method: FocalMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocalMethod {
    FileName,
    /// Number of shared function/class names
    NameOverlap(usize),
}

impl FocalMatch {
    /// Context item holding the leading `max_chars` characters of the file
    pub fn into_item(self, max_chars: usize) -> ContextItem {
        let segment: String = self.content.chars().take(max_chars).collect();
        ContextItem::new(self.path, segment, ContextKind::FocalFile)
    }
}

/// Find the source file `test_path` exercises.
///
/// Candidates are open documents, then project files, of the same language
/// and not themselves tests. The filename convention wins outright; otherwise
/// the candidate declaring the most names referenced by the test wins, ties
/// going to the earlier candidate.
pub async fn resolve_focal_file(
    workspace: &dyn Workspace,
    test_path: &str,
    test_content: &str,
    language: Language,
    deadline: &Deadline,
) -> Result<Option<FocalMatch>, DeadlineExceeded> {
    let open = workspace.open_documents().await;
    deadline.check()?;

    let mut seen = HashSet::new();
    let mut candidates: Vec<(String, Option<String>)> = Vec::new();
    for doc in open {
        if is_candidate(&doc.path, test_path, language) && seen.insert(doc.path.clone()) {
            candidates.push((doc.path, Some(doc.content)));
        }
    }
    match workspace.project_files(language).await {
        Ok(files) => {
            for path in files {
                if is_candidate(&path, test_path, language) && seen.insert(path.clone()) {
                    candidates.push((path, None));
                }
            }
        }
        Err(err) => log::warn!("Cannot list project files for focal resolution: {err}"),
    }
    deadline.check()?;

    let expected = language.focal_file_names(test_path);
    if !expected.is_empty() {
        for (path, content) in &candidates {
            if !expected.iter().any(|name| name == file_name(path)) {
                continue;
            }
            if let Some(content) = load(workspace, path, content.as_deref()).await {
                log::debug!("Focal file of {test_path} by name: {path}");
                return Ok(Some(FocalMatch {
                    path: path.clone(),
                    content,
                    method: FocalMethod::FileName,
                }));
            }
        }
    }

    let test_names = extract_referenced_names(test_content, language);
    if test_names.is_empty() {
        return Ok(None);
    }

    let mut best: Option<(usize, String, String)> = None;
    for (path, content) in candidates {
        deadline.check()?;
        let Some(content) = load(workspace, &path, content.as_deref()).await else {
            continue;
        };
        let names = extract_symbol_names(&content, language);
        let overlap = count_name_overlap(&names, &test_names);
        if overlap > 0 && best.as_ref().map_or(true, |(score, _, _)| overlap > *score) {
            best = Some((overlap, path, content));
        }
    }

    Ok(best.map(|(overlap, path, content)| {
        log::debug!("Focal file of {test_path} by {overlap} shared names: {path}");
        FocalMatch {
            path,
            content,
            method: FocalMethod::NameOverlap(overlap),
        }
    }))
}

fn is_candidate(path: &str, test_path: &str, language: Language) -> bool {
    path != test_path && Language::from_path(path) == language && !language.is_test_path(path)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

async fn load(workspace: &dyn Workspace, path: &str, open_content: Option<&str>) -> Option<String> {
    if let Some(content) = open_content {
        return Some(content.to_string());
    }
    match workspace.read_file(path).await {
        Ok(content) => Some(content),
        Err(err) => {
            log::warn!("Skipping focal candidate {path}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{ContextAssembler, ContextRequest};
    use crate::config::ContextConfig;
    use crate::error::{AssemblerError, Result};
    use crate::workspace::{InMemoryWorkspace, OpenDocument};
    use async_trait::async_trait;
    use nextedit_protocol::ContextOutcome;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn filename_convention_wins() {
        let ws = InMemoryWorkspace::new()
            .with_file("src/main/java/Other.java", "class Other { void add() {} }")
            .with_file("src/main/java/Calculator.java", "class Calculator {}");
        let found = resolve_focal_file(
            &ws,
            "src/test/java/CalculatorTest.java",
            "void testAdd() { calc.add(1, 2); }",
            Language::Java,
            &deadline(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.path, "src/main/java/Calculator.java");
        assert_eq!(found.method, FocalMethod::FileName);
    }

    #[tokio::test]
    async fn open_documents_are_preferred_over_project_files() {
        let ws = InMemoryWorkspace::new()
            .with_file("lib/parser.py", "old")
            .with_open("src/parser.py", "live");
        let found = resolve_focal_file(
            &ws,
            "tests/test_parser.py",
            "",
            Language::Python,
            &deadline(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.path, "src/parser.py");
        assert_eq!(found.content, "live");
    }

    #[tokio::test]
    async fn falls_back_to_name_overlap() {
        let ws = InMemoryWorkspace::new()
            .with_file("src/strings.ts", "export function padLeft(s: string) {}")
            .with_file(
                "src/math.ts",
                "export function addNumbers(a, b) {}\nexport function subtract(a, b) {}",
            )
            .with_file("src/other.test.ts", "function addNumbers() {}");
        let test = "it('works', () => { expect(addNumbers(1, 2)).toBe(3); subtract(3, 1); });";
        let found = resolve_focal_file(
            &ws,
            "src/calc.test.ts",
            test,
            Language::TypeScript,
            &deadline(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.path, "src/math.ts");
        assert_eq!(found.method, FocalMethod::NameOverlap(2));
    }

    #[tokio::test]
    async fn no_overlap_means_no_focal_file() {
        let ws = InMemoryWorkspace::new().with_file("src/a.py", "def unrelated(): pass");
        let found = resolve_focal_file(
            &ws,
            "tests/check.py",
            "def check_things(): assert compute() == 1",
            Language::Python,
            &deadline(),
        )
        .await
        .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn expired_deadline_is_reported() {
        let ws = InMemoryWorkspace::new().with_file("Foo.java", "class Foo {}");
        let result = resolve_focal_file(
            &ws,
            "FooTest.java",
            "",
            Language::Java,
            &Deadline::after(Duration::ZERO),
        )
        .await;
        assert_eq!(result, Err(DeadlineExceeded));
    }

    /// Wraps a workspace and fails every read of the listed paths
    struct UnreadableWorkspace {
        inner: InMemoryWorkspace,
        unreadable: Vec<&'static str>,
    }

    #[async_trait]
    impl Workspace for UnreadableWorkspace {
        async fn open_documents(&self) -> Vec<OpenDocument> {
            self.inner.open_documents().await
        }

        async fn read_file(&self, path: &str) -> Result<String> {
            if self.unreadable.iter().any(|p| *p == path) {
                return Err(AssemblerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "permission denied",
                )));
            }
            self.inner.read_file(path).await
        }

        async fn project_files(&self, language: Language) -> Result<Vec<String>> {
            self.inner.project_files(language).await
        }
    }

    #[tokio::test]
    async fn unreadable_name_match_falls_through_to_next_match() {
        let ws = UnreadableWorkspace {
            inner: InMemoryWorkspace::new()
                .with_file("lib/parser.py", "def parse(): pass")
                .with_file("src/parser.py", "def parse(text): return text"),
            unreadable: vec!["lib/parser.py"],
        };
        let found = resolve_focal_file(
            &ws,
            "tests/test_parser.py",
            "",
            Language::Python,
            &deadline(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.path, "src/parser.py");
        assert_eq!(found.method, FocalMethod::FileName);
    }

    #[tokio::test]
    async fn unreadable_name_match_falls_back_to_name_overlap() {
        let ws = UnreadableWorkspace {
            inner: InMemoryWorkspace::new()
                .with_file("src/math.ts", "export function padLeft(s) {}")
                .with_file("src/strings.ts", "export function padLeft(s) {}"),
            unreadable: vec!["src/math.ts"],
        };
        let test = "it('pads', () => { expect(padLeft('a')).toBe(' a'); });";
        let found = resolve_focal_file(
            &ws,
            "src/math.test.ts",
            test,
            Language::TypeScript,
            &deadline(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(found.path, "src/strings.ts");
        assert_eq!(found.method, FocalMethod::NameOverlap(1));
    }

    #[tokio::test]
    async fn unreadable_candidate_still_yields_found_context() {
        let ws = UnreadableWorkspace {
            inner: InMemoryWorkspace::new()
                .with_file("src/main/java/Calculator.java", "class Calculator {}")
                .with_file("lib/Calculator.java", "class Calculator { int add() {} }"),
            unreadable: vec!["src/main/java/Calculator.java"],
        };
        let assembler = ContextAssembler::new(ContextConfig::default()).unwrap();
        let request =
            ContextRequest::at_end("test/CalculatorTest.java", "class CalculatorTest {}", 0);

        let context = assembler.assemble(&request, &[], &ws).await;

        assert_eq!(context.outcome, ContextOutcome::Found);
        assert_eq!(context.items.len(), 1);
        assert_eq!(context.items[0].file_path, "lib/Calculator.java");
    }

    #[test]
    fn focal_item_holds_leading_segment() {
        let item = FocalMatch {
            path: "a.py".into(),
            content: "abcdef".into(),
            method: FocalMethod::FileName,
        }
        .into_item(4);
        assert_eq!(item.content, "abcd");
        assert_eq!(item.kind, ContextKind::FocalFile);
    }
}
