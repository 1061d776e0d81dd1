//! Errors raised while reading structural markup. All of them are fatal.

/// A structural violation in a markup record stream.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// The underlying reader failed.
    #[error("failed to read markup: {0}")]
    Io(#[from] std::io::Error),

    /// A close record named a different element than the innermost open one.
    #[error("line {line}: closing '{found}' but innermost open element is '{expected}'")]
    MismatchedClose {
        /// The innermost open element.
        expected: String,
        /// The element named by the close record.
        found: String,
        /// 1-based line of the close record.
        line: usize,
    },

    /// A close record appeared with no element open.
    #[error("line {line}: closing '{found}' with no open element")]
    UnexpectedClose {
        /// The element named by the close record.
        found: String,
        /// 1-based line of the close record.
        line: usize,
    },

    /// An attribute or text record appeared outside any element.
    #[error("line {line}: content outside of any element")]
    ContentOutsideElement {
        /// 1-based line of the record.
        line: usize,
    },

    /// A record started with an unknown tag character.
    #[error("line {line}: unknown record tag '{tag}'")]
    UnknownRecord {
        /// The offending lead character.
        tag: char,
        /// 1-based line of the record.
        line: usize,
    },

    /// An open or close record had no element name.
    #[error("line {line}: element record without a name")]
    MissingName {
        /// 1-based line of the record.
        line: usize,
    },

    /// A second top-level element was opened.
    #[error("line {line}: second root element '{name}'")]
    MultipleRoots {
        /// Name of the extra root.
        name: String,
        /// 1-based line of the record.
        line: usize,
    },

    /// Input ended with elements still open.
    #[error("input ended with '{0}' still open")]
    Unclosed(String),

    /// Input contained no element at all.
    #[error("input contains no root element")]
    Empty,

    /// A required attribute was absent.
    #[error("element '{element}' lacks required attribute '{attr}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attr: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mismatched_close() {
        let err = MarkupError::MismatchedClose {
            expected: "node".into(),
            found: "edge".into(),
            line: 7,
        };
        assert_eq!(
            err.to_string(),
            "line 7: closing 'edge' but innermost open element is 'node'"
        );
    }

    #[test]
    fn display_missing_attribute() {
        let err = MarkupError::MissingAttribute {
            element: "pb_type".into(),
            attr: "name".into(),
        };
        assert_eq!(
            err.to_string(),
            "element 'pb_type' lacks required attribute 'name'"
        );
    }
}
