use std::fmt;

/// Type tag of an extracted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    /// A heading that matched the keyword set
    Topic,

    /// A link into a discussion thread
    Discussion,
}

impl RecordType {
    /// String representation used in exports and the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Discussion => "discussion",
        }
    }

    /// Parses the representation produced by [`RecordType::as_str`]
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "topic" => Some(Self::Topic),
            "discussion" => Some(Self::Discussion),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured item extracted from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub record_type: RecordType,
    pub title: String,
    /// Link target, present for discussions
    pub url: Option<String>,
}

impl Record {
    pub fn topic(title: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::Topic,
            title: title.into(),
            url: None,
        }
    }

    pub fn discussion(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            record_type: RecordType::Discussion,
            title: title.into(),
            url: Some(url.into()),
        }
    }
}

/// Classification of an extraction failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionErrorKind {
    /// The content could not be decoded or parsed
    ParseError,
}

/// An extraction failure with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    pub kind: ExtractionErrorKind,
    pub message: String,
}

impl ExtractionError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ExtractionErrorKind::ParseError,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

/// Everything an extractor returns for one document
///
/// When `error` is set, `records` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// Document title, if the document has one
    pub page_title: Option<String>,

    /// Records in document order
    pub records: Vec<Record>,

    pub error: Option<ExtractionError>,
}

impl Extraction {
    /// Builds a failed extraction (no records)
    pub fn failed(error: ExtractionError) -> Self {
        Self {
            page_title: None,
            records: Vec::new(),
            error: Some(error),
        }
    }

    /// Returns true if extraction produced no error
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_strings() {
        for record_type in [RecordType::Topic, RecordType::Discussion] {
            assert_eq!(
                RecordType::from_db_string(record_type.as_str()),
                Some(record_type)
            );
        }
        assert_eq!(RecordType::from_db_string("python_topic"), None);
    }

    #[test]
    fn test_record_constructors() {
        let topic = Record::topic("Learning Python Basics");
        assert_eq!(topic.record_type, RecordType::Topic);
        assert!(topic.url.is_none());

        let discussion = Record::discussion("A thread", "/r/Python/comments/abc/");
        assert_eq!(discussion.record_type, RecordType::Discussion);
        assert_eq!(discussion.url.as_deref(), Some("/r/Python/comments/abc/"));
    }

    #[test]
    fn test_failed_extraction_has_no_records() {
        let extraction = Extraction::failed(ExtractionError::parse("invalid utf-8"));
        assert!(!extraction.is_ok());
        assert!(extraction.records.is_empty());
    }
}
