use crate::image_classifier::interface::ClassificationError;
use std::path::Path;

/// Reads a newline delimited label file, one label per model output index.
pub fn read_labels(path: &Path) -> Result<Vec<String>, ClassificationError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ClassificationError::Labels(format!("{}: {}", path.display(), e)))?;

    parse_labels(&contents)
}

pub fn parse_labels(contents: &str) -> Result<Vec<String>, ClassificationError> {
    let labels: Vec<String> = contents
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect();

    // A trailing newline is common, blank lines in the middle still take an index.
    let labels = match labels.iter().rposition(|label| !label.trim().is_empty()) {
        Some(last) => labels[..=last].to_vec(),
        None => return Err(ClassificationError::Labels("label file is empty".to_string())),
    };

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_keeps_indices() {
        let labels = parse_labels("dummy\nkit fox\n\nEnglish setter\n\n").unwrap();
        assert_eq!(labels, vec!["dummy", "kit fox", "", "English setter"]);
    }

    #[test]
    fn test_parse_handles_crlf() {
        let labels = parse_labels("a\r\nb\r\n").unwrap();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_file_is_an_error() {
        assert!(matches!(
            parse_labels("\n\n"),
            Err(ClassificationError::Labels(_))
        ));
    }

    #[test]
    fn test_read_labels_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tabby").unwrap();
        writeln!(file, "tiger cat").unwrap();

        let labels = read_labels(file.path()).unwrap();
        assert_eq!(labels, vec!["tabby", "tiger cat"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = read_labels(Path::new("/definitely/not/here/labels.txt"));
        assert!(matches!(result, Err(ClassificationError::Labels(_))));
    }
}
