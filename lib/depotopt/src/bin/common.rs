use std::fmt::Display;
use std::str::FromStr;
use std::path::PathBuf;
use std::io;
use anyhow::{Context, Result};
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
pub struct OutputOptions {
  /// `json` writes the chosen depot coordinates, `json-summ` the run summary.
  #[structopt(long="format", short="f", parse(try_from_str), default_value="json", possible_values=&["json", "json-summ"])]
  pub fmt: OutputFormat,
  /// Write to this file instead of stdout.
  #[structopt(long="output", short="o")]
  pub file: Option<PathBuf>,
  /// Also log as JSON lines to this file.
  #[structopt(long)]
  pub log: Option<PathBuf>,
}

impl OutputOptions {
  pub fn writer(&self) -> Result<Box<dyn io::Write>> {
    match self.file.as_ref() {
      Some(path) => {
        let f = std::fs::File::create(path).with_context(|| format!("failed to create {:?}", path))?;
        Ok(Box::new(io::BufWriter::new(f)))
      }
      None => Ok(Box::new(io::stdout())),
    }
  }
}

pub fn clap_range_validator<T>(minval: Option<T>, maxval: Option<T>) -> impl Fn(String) -> Result<(), String>
    where
        T: FromStr + PartialOrd + Display + Copy,
        T::Err: Display
{
    return move |val| {
        let x: T = val.parse().map_err(|e: T::Err| e.to_string())?;
        if let Some(y) = minval {
            if x < y { return Err(format!("must be at least {}", y)); }
        }
        if let Some(y) = maxval {
            if x > y { return Err(format!("must be at most {}", y)); }
        }
        return Ok(());
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Depots,
    Summary,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "json" => Ok(Self::Depots),
            "json-summ" => Ok(Self::Summary),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}
