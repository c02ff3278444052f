mod tables;
pub use tables::{
  LocationsCsv,
  DistancesCsv,
  PopulationCsv,
  HubDistanceCsv,
  DelayCsv,
};

mod nom_prelude {
  pub use nom::{
    IResult,
    error::{
      self,
      ParseError,
    },
    branch::alt,
    sequence::*,
    multi::*,
    combinator::*,
    character::complete::*,
    bytes::complete::{tag, is_not},
    Finish,
  };
  pub use std::str::FromStr;
}

mod common;

pub trait ParseTable<Fmt>: Sized {
  fn parse(inputs: Fmt) -> crate::Result<Self>;
}
