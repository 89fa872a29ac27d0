//! Line-oriented splitting and joining of multi-document YAML files.
//!
//! This is deliberately not a YAML parser: a document ends at a line that is
//! exactly the separator token. Lines carrying a quote character get embedded
//! separator occurrences escaped so a quoted scalar such as `a: "---"` never
//! looks like a boundary to downstream tooling. Joining reverses the escape.

use std::borrow::Cow;

/// The document separator token.
pub const SEPARATOR: &str = "---";

const ESCAPED_SEPARATOR: &str = "\\---";

/// Split file content into document bodies.
///
/// Every body keeps its lines newline-terminated, and empty bodies between
/// consecutive separators are kept, so [`join_documents`] restores the input.
/// A trailing body is only emitted when it is non-empty.
pub fn split_documents(content: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if line == SEPARATOR {
            documents.push(std::mem::take(&mut current));
            continue;
        }

        if line.contains('"') || line.contains('\'') {
            current.push_str(&line.replace(SEPARATOR, ESCAPED_SEPARATOR));
        } else {
            current.push_str(line);
        }
        current.push('\n');
    }

    if !current.is_empty() {
        documents.push(current);
    }

    documents
}

/// Undo the separator escaping [`split_documents`] applied to quoted lines.
///
/// Typed decoders must see this form: `"\---"` is not a valid YAML escape.
pub fn unescape_document(body: &str) -> Cow<'_, str> {
    if !body.contains(ESCAPED_SEPARATOR) {
        return Cow::Borrowed(body);
    }

    Cow::Owned(
        body.split_inclusive('\n')
            .map(|line| {
                if line.contains('"') || line.contains('\'') {
                    Cow::Owned(line.replace(ESCAPED_SEPARATOR, SEPARATOR))
                } else {
                    Cow::Borrowed(line)
                }
            })
            .collect(),
    )
}

/// Join document bodies with bare separator lines, unescaping quoted separators.
pub fn join_documents<S: AsRef<str>>(documents: &[S]) -> String {
    let mut out = String::new();

    for (idx, doc) in documents.iter().enumerate() {
        if idx > 0 {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(SEPARATOR);
            out.push('\n');
        }
        out.push_str(&unescape_document(doc.as_ref()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_document_without_separator() {
        let docs = split_documents("kind: ConfigMap\nmetadata:\n  name: a\n");
        assert_eq!(docs, vec!["kind: ConfigMap\nmetadata:\n  name: a\n"]);
    }

    #[test]
    fn test_splits_on_exact_separator_lines() {
        let docs = split_documents("a: 1\n---\nb: 2\n---\nc: 3");
        assert_eq!(docs, vec!["a: 1\n", "b: 2\n", "c: 3\n"]);
    }

    #[test]
    fn test_separator_with_trailing_text_is_not_a_boundary() {
        let docs = split_documents("a: 1\n--- # comment\nb: 2\n");
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_leading_separator_keeps_empty_body() {
        let input = "---\na: 1\n";
        let docs = split_documents(input);
        assert_eq!(docs, vec!["", "a: 1\n"]);
        assert_eq!(join_documents(&docs), input);
    }

    #[test]
    fn test_trailing_separator_drops_empty_tail() {
        let docs = split_documents("a: 1\n---\n");
        assert_eq!(docs, vec!["a: 1\n"]);
    }

    #[test]
    fn test_quoted_separator_is_not_split_and_is_escaped() {
        let docs = split_documents("a: \"---\"\nb: 'x---y'\nc: ---x\n");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0], "a: \"\\---\"\nb: 'x\\---y'\nc: ---x\n");
    }

    #[test]
    fn test_quoted_separator_survives_round_trip() {
        let input = "a: \"---\"\n---\nb: 'x---y'\nc: \\---\n";
        let docs = split_documents(input);
        assert_eq!(docs.len(), 2);
        assert_eq!(unescape_document(&docs[0]), "a: \"---\"\n");
        assert_eq!(join_documents(&docs), input);
    }

    #[test]
    fn test_unescaped_document_decodes() {
        let docs = split_documents("data:\n  marker: \"---\"\n");
        let value: serde_yaml::Value = serde_yaml::from_str(&unescape_document(&docs[0])).unwrap();
        assert_eq!(value["data"]["marker"], serde_yaml::Value::from("---"));
    }

    #[test]
    fn test_join_adds_missing_newline_before_separator() {
        let joined = join_documents(&["a: 1", "b: 2\n"]);
        assert_eq!(joined, "a: 1\n---\nb: 2\n");
    }

    fn body() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-z0-9:. -]{0,20}", 1..5)
            .prop_map(|lines| lines.into_iter().map(|l| l + "\n").collect())
    }

    proptest! {
        #[test]
        fn prop_split_then_join_is_lossless(bodies in prop::collection::vec(body(), 1..6)) {
            let original = join_documents(&bodies);
            let docs = split_documents(&original);
            prop_assert_eq!(docs.len(), bodies.len());
            prop_assert_eq!(join_documents(&docs), original);
        }
    }
}
