use crate::config::ContextConfig;
use nextedit_code_chunker::Language;
use nextedit_protocol::StrategyKind;

/// What a request will gather, decided once from the active file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Active file is a test file; hand out the source file it exercises
    FocalFile { language: Language },
    /// Edit-history diffs and/or BM25-ranked chunks from neighbouring files
    Neighbors { edit_history: bool, cross_file: bool },
    Disabled,
}

impl Strategy {
    pub fn select(file_path: &str, config: &ContextConfig) -> Self {
        let language = Language::from_path(file_path);

        if config.focal_file_enabled
            && language.supports_focal_file()
            && language.is_test_path(file_path)
        {
            return Self::FocalFile { language };
        }

        let edit_history = config.edit_history_enabled;
        let cross_file = config.cross_file_enabled && language.supports_cross_file();
        if edit_history || cross_file {
            Self::Neighbors {
                edit_history,
                cross_file,
            }
        } else {
            Self::Disabled
        }
    }

    pub const fn kind(self) -> StrategyKind {
        match self {
            Self::FocalFile { .. } => StrategyKind::FocalFile,
            Self::Neighbors {
                edit_history: true,
                cross_file: true,
            } => StrategyKind::EditHistoryAndCrossFile,
            Self::Neighbors {
                edit_history: true,
                cross_file: false,
            } => StrategyKind::EditHistory,
            Self::Neighbors {
                edit_history: false,
                cross_file: true,
            } => StrategyKind::CrossFile,
            Self::Neighbors { .. } | Self::Disabled => StrategyKind::Disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_files_of_focal_languages_use_focal_strategy() {
        let config = ContextConfig::default();
        assert_eq!(
            Strategy::select("src/foo.test.ts", &config),
            Strategy::FocalFile {
                language: Language::TypeScript
            }
        );
        assert_eq!(
            Strategy::select("tests/test_parser.py", &config).kind(),
            StrategyKind::FocalFile
        );
        // Go has test conventions but no focal resolution
        assert_eq!(
            Strategy::select("pkg/foo_test.go", &config).kind(),
            StrategyKind::EditHistoryAndCrossFile
        );
    }

    #[test]
    fn unknown_language_gets_history_only() {
        let config = ContextConfig::default();
        assert_eq!(
            Strategy::select("notes.txt", &config),
            Strategy::Neighbors {
                edit_history: true,
                cross_file: false
            }
        );
    }

    #[test]
    fn disabled_when_nothing_applies() {
        let config = ContextConfig {
            edit_history_enabled: false,
            cross_file_enabled: false,
            focal_file_enabled: false,
            ..Default::default()
        };
        assert_eq!(Strategy::select("FooTest.java", &config), Strategy::Disabled);
        assert_eq!(Strategy::Disabled.kind(), StrategyKind::Disabled);
    }

    #[test]
    fn focal_disabled_falls_back_to_neighbors() {
        let config = ContextConfig {
            focal_file_enabled: false,
            ..Default::default()
        };
        assert_eq!(
            Strategy::select("FooTest.java", &config).kind(),
            StrategyKind::EditHistoryAndCrossFile
        );
    }
}
