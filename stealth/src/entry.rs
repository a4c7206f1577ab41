//! Reading datasets in the svmlight format.
//!
//! ```text
//! # free comment
//! # free comment
//! # free comment
//! # 2 1
//! 0 0:1.5 3:-2
//! 1 1:0.25
//! ```
//! The fourth comment line, if any, carries the class sizes.
use crate::error::TransportError;
use definitions::{ClassSizes, DataSet, Datum, Label, SparseVector};
use std::io::BufRead;

const CLASS_SIZE_LINE: usize = 4;

fn parse_error(line: usize, message: String) -> TransportError {
    TransportError::Parse { line, message }
}

fn parse_label(token: &str, line: usize) -> Result<Label, TransportError> {
    if let Ok(label) = token.parse::<Label>() {
        return Ok(label);
    }
    // Labels written as floats, such as `1.0`.
    match token.parse::<f64>() {
        Ok(x) if 0f64 <= x && x.fract() == 0f64 && x < Label::MAX as f64 => Ok(x as Label),
        _ => Err(parse_error(line, format!("invalid label {}", token))),
    }
}

fn parse_entry(token: &str, line: usize) -> Result<(u64, f64), TransportError> {
    let mut fields = token.splitn(2, ':');
    let index = fields.next().and_then(|idx| idx.parse::<u64>().ok());
    let value = fields.next().and_then(|val| val.parse::<f64>().ok());
    match (index, value) {
        (Some(index), Some(value)) => Ok((index, value)),
        _ => Err(parse_error(line, format!("invalid entry {}", token))),
    }
}

fn parse_datum(content: &str, line: usize) -> Result<Datum, TransportError> {
    let mut tokens = content.split_whitespace();
    let label = match tokens.next() {
        Some(token) => parse_label(token, line)?,
        None => return Err(parse_error(line, "no label".to_string())),
    };
    let entries = tokens
        .map(|token| parse_entry(token, line))
        .collect::<Result<Vec<_>, _>>()?;
    let feature = SparseVector::new(entries)
        .ok_or_else(|| parse_error(line, "duplicated index".to_string()))?;
    Ok(Datum::new(label, feature))
}

fn parse_class_sizes(content: &str, line: usize) -> Result<ClassSizes, TransportError> {
    let sizes = content
        .get(2..)
        .unwrap_or("")
        .split_whitespace()
        .map(|token| {
            token
                .parse::<u64>()
                .map_err(|_| parse_error(line, format!("invalid class size {}", token)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ClassSizes::new(sizes))
}

/// Parse a dataset. The class sizes are `None` if there is no fourth comment line.
pub fn parse_dataset<R: BufRead>(reader: R) -> Result<(DataSet, Option<ClassSizes>), TransportError> {
    let mut data = vec![];
    let mut class_sizes = None;
    let mut comments = 0;
    for (i, content) in reader.lines().enumerate() {
        let (line, content) = (i + 1, content?);
        if content.starts_with('#') {
            comments += 1;
            if comments == CLASS_SIZE_LINE {
                class_sizes = Some(parse_class_sizes(&content, line)?);
            }
        } else if !content.trim().is_empty() {
            data.push(parse_datum(&content, line)?);
        }
    }
    debug!("Parsed\t{}\tdata\t{}\tcomments", data.len(), comments);
    Ok((DataSet::new(data), class_sizes))
}

/// Read a dataset from a file. `-` is the standard input.
pub fn read_dataset<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<(DataSet, Option<ClassSizes>), TransportError> {
    let path = path.as_ref();
    if path == std::path::Path::new("-") {
        let stdin = std::io::stdin();
        parse_dataset(std::io::BufReader::new(stdin.lock()))
    } else {
        let reader = std::fs::File::open(path).map(std::io::BufReader::new)?;
        parse_dataset(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const INPUT: &str = "# Generated
# Column indices are zero-based
# comment
# 2 1

0 3:-2 0:1.5
1.0 1:0.25
0
";
    #[test]
    fn parse() {
        let (dataset, sizes) = parse_dataset(INPUT.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset[0].label, 0);
        assert_eq!(dataset[0].feature.entries(), &[(0, 1.5), (3, -2.0)]);
        assert_eq!(dataset[1].label, 1);
        assert_eq!(dataset[1].feature.entries(), &[(1, 0.25)]);
        assert!(dataset[2].feature.is_empty());
        let sizes = sizes.unwrap();
        assert_eq!(sizes.get(0), Some(2));
        assert_eq!(sizes.get(1), Some(1));
        assert_eq!(sizes.get(2), None);
    }
    #[test]
    fn no_class_sizes() {
        let (dataset, sizes) = parse_dataset("# a\n0 1:1\n1 2:2\n".as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(sizes.is_none());
    }
    #[test]
    fn errors() {
        let lines = |input: &str| match parse_dataset(input.as_bytes()) {
            Err(TransportError::Parse { line, .. }) => line,
            other => panic!("{:?}", other),
        };
        assert_eq!(lines("0 1:1\n0 1:1 1:2\n"), 2);
        assert_eq!(lines("0 1:x\n"), 1);
        assert_eq!(lines("0 1\n"), 1);
        assert_eq!(lines("-1 1:1\n"), 1);
        assert_eq!(lines("0.5 1:1\n"), 1);
        assert_eq!(lines("0 1:1\n1e300 1:1\n"), 2);
        assert_eq!(lines("#\n#\n#\n# 1 a\n"), 4);
    }
}
