use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("expected 'field=value', got '{0}'")]
    Malformed(String),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Splits `id=value` into its parts. The value may be empty or contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), AssignmentError> {
    let re = Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*=(.*)$")?;
    let caps = re
        .captures(raw)
        .ok_or_else(|| AssignmentError::Malformed(raw.to_string()))?;
    Ok((caps[1].to_string(), caps[2].trim().to_string()))
}

/// Parses every assignment, stopping at the first malformed one.
pub fn parse_assignments(raw: &[String]) -> Result<Vec<(String, String)>, AssignmentError> {
    raw.iter().map(|a| parse_assignment(a)).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_assignment_splits_id_and_value() {
        assert_eq!(
            parse_assignment("gross_income=35,000").unwrap(),
            ("gross_income".to_string(), "35,000".to_string())
        );
        assert_eq!(
            parse_assignment(" amount = 12.5 ").unwrap(),
            ("amount".to_string(), "12.5".to_string())
        );
    }

    #[test]
    fn parse_assignment_allows_empty_value() {
        assert_eq!(
            parse_assignment("isee=").unwrap(),
            ("isee".to_string(), String::new())
        );
    }

    #[test]
    fn parse_assignment_keeps_series_with_spaces() {
        assert_eq!(
            parse_assignment("cash_flows=-100; 60; 60").unwrap().1,
            "-100; 60; 60"
        );
    }

    #[test]
    fn parse_assignment_rejects_malformed() {
        assert!(matches!(
            parse_assignment("no equals sign"),
            Err(AssignmentError::Malformed(_))
        ));
        assert!(parse_assignment("=5").is_err());
        assert!(parse_assignment("1abc=5").is_err());
    }

    #[test]
    fn parse_assignments_stops_at_first_error() {
        let raw = vec!["a=1".to_string(), "bad".to_string()];

        assert!(parse_assignments(&raw).is_err());
        assert_eq!(parse_assignments(&raw[..1]).unwrap().len(), 1);
    }
}
