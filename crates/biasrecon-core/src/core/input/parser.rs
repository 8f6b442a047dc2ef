use super::arguments::BiasArguments;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BiasInputError {
    #[error("Bias parser requires a {0}")]
    MissingArgument(&'static str),
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("No '{marker}' section found in the PLUMED input")]
    SectionNotFound { marker: String },
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    key: &'a str,
    value: &'a str,
    span: Range<usize>,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Collects `identifier="value"` tokens. The value holds at least one character
/// and stops at the first following quote on the same line.
fn scan_quoted(section: &str) -> Vec<Token<'_>> {
    let chars: Vec<(usize, char)> = section.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(section.len(), |&(b, _)| b);
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if !is_word(chars[pos].1) {
            pos += 1;
            continue;
        }
        let start = pos;
        while pos < chars.len() && is_word(chars[pos].1) {
            pos += 1;
        }
        let opens_quote = matches!(chars.get(pos), Some((_, '=')))
            && matches!(chars.get(pos + 1), Some((_, '"')));
        if !opens_quote {
            continue;
        }

        let value_start = pos + 2;
        let mut close = value_start + 1;
        while close < chars.len() && chars[close].1 != '"' && chars[close].1 != '\n' {
            close += 1;
        }
        let has_content = matches!(chars.get(value_start), Some((_, c)) if *c != '\n');
        if has_content && matches!(chars.get(close), Some((_, '"'))) {
            tokens.push(Token {
                key: &section[byte_at(start)..byte_at(pos)],
                value: &section[byte_at(value_start)..byte_at(close)],
                span: byte_at(start)..byte_at(close + 1),
            });
            pos = close + 1;
        }
    }
    tokens
}

/// Collects `identifier=non-whitespace` tokens outside the `consumed` spans.
fn scan_bare<'a>(section: &'a str, consumed: &[Range<usize>]) -> Vec<Token<'a>> {
    let chars: Vec<(usize, char)> = section.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(section.len(), |&(b, _)| b);
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let byte = byte_at(pos);
        if let Some(span) = consumed.iter().find(|span| span.contains(&byte)) {
            while pos < chars.len() && byte_at(pos) < span.end {
                pos += 1;
            }
            continue;
        }
        if !is_word(chars[pos].1) {
            pos += 1;
            continue;
        }
        let start = pos;
        while pos < chars.len() && is_word(chars[pos].1) {
            pos += 1;
        }
        if !matches!(chars.get(pos), Some((_, '='))) {
            continue;
        }

        let value_start = pos + 1;
        let mut end = value_start;
        while end < chars.len() && !chars[end].1.is_whitespace() {
            end += 1;
        }
        if end > value_start {
            tokens.push(Token {
                key: &section[byte_at(start)..byte_at(pos)],
                value: &section[byte_at(value_start)..byte_at(end)],
                span: byte_at(start)..byte_at(end),
            });
            pos = end;
        }
    }
    tokens
}

/// Extracts the arguments of the `bias_type` action from PLUMED input text.
///
/// The section runs from the first case-sensitive occurrence of the uppercased
/// `bias_type` up to its next occurrence, or to the end of the input. Quoted tokens are collected before bare ones, and the
/// first occurrence of a key wins.
pub fn parse_bias_str(input: &str, bias_type: &str) -> Result<BiasArguments, BiasInputError> {
    if bias_type.is_empty() {
        return Err(BiasInputError::MissingArgument("bias type"));
    }
    let marker = bias_type.to_uppercase();
    let section_start = input
        .find(&marker)
        .ok_or_else(|| BiasInputError::SectionNotFound {
            marker: marker.clone(),
        })?;
    let rest = &input[section_start + marker.len()..];
    let section = rest.find(&marker).map_or(rest, |end| &rest[..end]);

    let quoted = scan_quoted(section);
    let consumed: Vec<Range<usize>> = quoted.iter().map(|t| t.span.clone()).collect();
    let bare = scan_bare(section, &consumed);

    let mut arguments = BiasArguments::new();
    for token in quoted.into_iter().chain(bare) {
        let key = token.key.to_lowercase();
        if arguments.contains_key(&key) {
            debug!("Ignoring repeated argument '{}={}'", token.key, token.value);
            continue;
        }
        let values = token.value.split(',').map(str::to_string).collect();
        arguments.insert(&key, values);
    }

    debug!(
        "Parsed {} argument(s) from the {} section: {:?}",
        arguments.len(),
        marker,
        arguments.keys().collect::<Vec<_>>()
    );
    Ok(arguments)
}

/// Reads a PLUMED input file and extracts the arguments of the `bias_type` action.
///
/// # Errors
///
/// Both arguments are required; a missing one is reported before the file is read.
pub fn parse_bias(
    path: Option<&Path>,
    bias_type: Option<&str>,
) -> Result<BiasArguments, BiasInputError> {
    let path = path.ok_or(BiasInputError::MissingArgument("filename"))?;
    let bias_type = bias_type
        .filter(|b| !b.is_empty())
        .ok_or(BiasInputError::MissingArgument("bias type"))?;

    let content = std::fs::read_to_string(path).map_err(|e| BiasInputError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    parse_bias_str(&content, bias_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PLUMED_INPUT: &str = "\
phi: TORSION ATOMS=5,7,9,15
psi: TORSION ATOMS=7,9,15,17
metad: METAD ARG=phi,psi PACE=500 HEIGHT=1.2 SIGMA=0.35,0.35 FILE=HILLS GRID_MIN=-pi,-pi GRID_MAX=pi,pi BIASFACTOR=10 TEMP=300
PRINT STRIDE=10 ARG=phi,psi,metad.bias FILE=COLVAR
";

    #[test]
    fn parse_bias_str_extracts_lowercased_keys_and_comma_lists() {
        let args = parse_bias_str(PLUMED_INPUT, "metad").unwrap();
        assert_eq!(args.cv_names(), &["phi".to_string(), "psi".to_string()]);
        assert_eq!(args.get("sigma").unwrap(), &["0.35", "0.35"]);
        assert_eq!(args.get("grid_min").unwrap(), &["-pi", "-pi"]);
        assert_eq!(args.get("pace").unwrap(), &["500"]);
        assert_eq!(args.get("temp").unwrap(), &["300"]);
    }

    #[test]
    fn parse_bias_str_skips_text_before_the_marker() {
        let args = parse_bias_str(PLUMED_INPUT, "MetaD").unwrap();
        assert!(!args.contains_key("atoms"));
    }

    #[test]
    fn parse_bias_str_keeps_first_occurrence_of_a_key() {
        let args = parse_bias_str(PLUMED_INPUT, "metad").unwrap();
        assert_eq!(args.get("file").unwrap(), &["HILLS"]);
        assert_eq!(args.cv_names().len(), 2);
    }

    #[test]
    fn parse_bias_str_stops_at_the_next_action_of_the_same_type() {
        let input = "\
a: METAD ARG=phi SIGMA=0.35 GRID_MIN=-pi GRID_MAX=pi
b: METAD ARG=psi SIGMA=0.2 GRID_MIN=-pi GRID_MAX=pi BIASFACTOR=8
";
        let args = parse_bias_str(input, "metad").unwrap();
        assert_eq!(args.cv_names(), &["phi".to_string()]);
        assert!(!args.contains_key("biasfactor"));
        assert_eq!(args.get("sigma").unwrap(), &["0.35"]);
    }

    #[test]
    fn parse_bias_str_gives_quoted_tokens_precedence() {
        let input = r#"METAD ARG=x LABEL="my bias" SIGMA=0.1 TITLE="a,b""#;
        let args = parse_bias_str(input, "metad").unwrap();
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["label", "title", "arg", "sigma"]);
        assert_eq!(args.get("label").unwrap(), &["my bias"]);
        assert_eq!(args.get("title").unwrap(), &["a", "b"]);
    }

    #[test]
    fn parse_bias_str_leaves_pi_tokens_textual() {
        let args = parse_bias_str("METAD GRID_MAX=pi", "metad").unwrap();
        assert_eq!(args.get("grid_max").unwrap(), &["pi"]);
    }

    #[test]
    fn parse_bias_str_ignores_keys_without_values() {
        let args = parse_bias_str("METAD ARG= SIGMA=0.2", "metad").unwrap();
        assert!(!args.contains_key("arg"));
        assert_eq!(args.get("sigma").unwrap(), &["0.2"]);
    }

    #[test]
    fn parse_bias_str_fails_when_section_is_missing() {
        let result = parse_bias_str(PLUMED_INPUT, "pbmetad");
        assert!(matches!(
            result,
            Err(BiasInputError::SectionNotFound { marker }) if marker == "PBMETAD"
        ));
    }

    #[test]
    fn parse_bias_requires_filename_and_bias_type() {
        assert!(matches!(
            parse_bias(None, Some("metad")),
            Err(BiasInputError::MissingArgument("filename"))
        ));
        let dir = tempdir().unwrap();
        let path = dir.path().join("plumed.dat");
        assert!(matches!(
            parse_bias(Some(&path), None),
            Err(BiasInputError::MissingArgument("bias type"))
        ));
    }

    #[test]
    fn parse_bias_reads_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plumed.dat");
        fs::write(&path, PLUMED_INPUT).unwrap();
        let args = parse_bias(Some(&path), Some("metad")).unwrap();
        assert_eq!(args.get("biasfactor").unwrap(), &["10"]);
    }

    #[test]
    fn parse_bias_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.dat");
        let result = parse_bias(Some(&path), Some("metad"));
        assert!(matches!(result, Err(BiasInputError::Io { .. })));
    }
}
