use super::nom_prelude::*;
use crate::{Error, Result};

type Verbose<'a> = error::VerboseError<&'a str>;

fn quoted<'a, E>(input: &'a str) -> IResult<&'a str, String, E>
  where
    E: ParseError<&'a str>
{
  delimited(
    char('"'),
    map(
      many0(alt((value('"', tag("\"\"")), none_of("\"")))),
      |cs: Vec<char>| cs.into_iter().collect(),
    ),
    char('"'),
  )(input)
}

fn bare<'a, E>(input: &'a str) -> IResult<&'a str, String, E>
  where
    E: ParseError<&'a str>
{
  map(opt(is_not(",\r\n\"")), |s: Option<&str>| s.unwrap_or("").trim().to_string())(input)
}

fn field<'a, E>(input: &'a str) -> IResult<&'a str, String, E>
  where
    E: ParseError<&'a str>
{
  alt((delimited(space0, quoted, space0), bare))(input)
}

fn record(input: &str) -> IResult<&str, Vec<String>, Verbose<'_>> {
  separated_list0(char(','), field)(input)
}

/// Split CSV text into records, skipping the header row and blank lines.  Each record is returned
/// with its 1-based line number.
pub fn records(input: &str) -> Result<Vec<(usize, Vec<String>)>> {
  let mut out = Vec::new();
  for (k, line) in input.lines().enumerate().skip(1) {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
      continue;
    }
    match all_consuming(record)(line).finish() {
      Ok((_, fields)) => out.push((k + 1, fields)),
      Err(e) => return Err(Error::MalformedRecord { line: k + 1, reason: e.to_string() }.into()),
    }
  }
  Ok(out)
}

pub fn column(line: usize, fields: &[String], column: usize) -> Result<&str> {
  fields.get(column)
    .map(|s| s.as_str())
    .ok_or_else(|| Error::MissingColumn { line, column }.into())
}

pub fn float_column(line: usize, fields: &[String], col: usize) -> Result<f64> {
  let s = column(line, fields, col)?;
  f64::from_str(s.trim()).map_err(|e| Error::MalformedRecord {
    line,
    reason: format!("column {}: {:?} is not a number ({})", col, s, e),
  }.into())
}
