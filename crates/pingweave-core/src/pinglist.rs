//! The pinglist: an opaque mapping of probe targets.
//!
//! Its schema belongs to the probing agents. The control plane only checks
//! that the YAML document is a mapping with string keys, then serves it
//! back as JSON unchanged.

use std::path::PathBuf;

use serde_json::{Map, Value};

pub type Pinglist = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("pinglist not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse pinglist: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("pinglist top level is not a mapping")]
    NotAMapping,
}

/// Parse a YAML document into a pinglist. An empty document is an empty list.
pub fn parse_pinglist(text: &str) -> Result<Pinglist, LoadError> {
    if text.trim().is_empty() {
        return Ok(Pinglist::new());
    }
    match serde_yaml::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Pinglist::new()),
        _ => Err(LoadError::NotAMapping),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_mapping_is_kept_verbatim() {
        let text = "\
rdma:
  host-a:
    - 10.0.0.1
    - 10.0.0.2
udp:
  host-b: [10.0.1.1]
";
        let list = parse_pinglist(text).unwrap();
        assert_eq!(
            Value::Object(list),
            json!({
                "rdma": { "host-a": ["10.0.0.1", "10.0.0.2"] },
                "udp": { "host-b": ["10.0.1.1"] }
            })
        );
    }

    #[test]
    fn empty_document_is_empty_list() {
        assert!(parse_pinglist("").unwrap().is_empty());
        assert!(parse_pinglist("  \n").unwrap().is_empty());
        assert!(parse_pinglist("~\n").unwrap().is_empty());
    }

    #[test]
    fn sequence_at_top_level_is_rejected() {
        assert!(matches!(
            parse_pinglist("- a\n- b\n"),
            Err(LoadError::NotAMapping)
        ));
    }

    #[test]
    fn broken_yaml_is_a_parse_error() {
        assert!(matches!(
            parse_pinglist("rdma: [unclosed\n"),
            Err(LoadError::Parse(_))
        ));
    }
}
