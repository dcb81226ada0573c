/// Split on anything that is not alphanumeric or `_`, lowercase each part.
///
/// `fooBar.baz_qux(1)` becomes `["foobar", "baz_qux", "1"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_punctuation_and_whitespace() {
        assert_eq!(
            tokenize("fooBar.baz_qux(1)"),
            vec!["foobar", "baz_qux", "1"]
        );
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("{}();\n\t").is_empty());
    }

    #[test]
    fn keeps_non_ascii_words() {
        assert_eq!(tokenize("größe = Größe"), vec!["größe", "größe"]);
    }
}
