use std::fmt;
use std::path::Path;
use fnv::FnvHashMap;

pub mod config;
pub mod extract;
pub mod graph;
pub mod pipeline;
pub mod qubo;
pub mod registry;
pub mod solve;

pub use config::Config;
pub use graph::Topology;
pub use pipeline::{place_depots, Placement};
pub use stations::raw::{StationId, Coord, DistanceRecords};

pub type Map<K, V> = FnvHashMap<K, V>;


#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    NegativeDistance { from: StationId, to: StationId, distance: f64 },
    UnknownStation(StationId),
    TooManyVariables { variables: usize, max: usize },
    CostCountMismatch { nodes: usize, costs: usize },
    NoSamples,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NegativeDistance { from, to, distance } =>
                write!(f, "distance {} -> {} must be finite and non-negative (got {})", from, to, distance),
            Error::UnknownStation(s) => write!(f, "unknown station {:?}", s),
            Error::TooManyVariables { variables, max } =>
                write!(f, "{} variables is too many for exhaustive search (max {})", variables, max),
            Error::CostCountMismatch { nodes, costs } =>
                write!(f, "graph has {} nodes but {} costs were given", nodes, costs),
            Error::NoSamples => f.write_str("sampler returned no samples"),
        }
    }
}

impl std::error::Error for Error {}


mod logging_setup {
    use super::*;
    use anyhow::Context;
    use tracing_subscriber::{EnvFilter, fmt, registry, prelude::*};
    use tracing_appender::{non_blocking, non_blocking::WorkerGuard};
    use std::fs::OpenOptions;

    fn build_and_set_global_subscriber<P>(logfile: Option<P>, is_test : bool) -> anyhow::Result<Option<WorkerGuard>> where
        P : AsRef<Path>
    {
        let stderr_log = fmt::layer();
        let env_filter = EnvFilter::from_default_env();
        let r = registry().with(stderr_log).with(env_filter);

        let flush_guard = match logfile {
            Some(p) => {
                let p = p.as_ref();
                let logfile = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(p)
                    .with_context(|| format!("failed to open log file {:?}", p))?;
                let (writer, _guard) = non_blocking::NonBlockingBuilder::default()
                    .lossy(false)
                    .finish(logfile);
                let json = fmt::layer()
                    .json()
                    .with_span_list(true)
                    .with_current_span(false)
                    .with_writer(writer);

                let r = r.with(json);
                if is_test { r.try_init().ok(); }
                else { r.init(); }
                Some(_guard)
            },
            None => {
                if is_test { r.try_init().ok(); }
                else { r.init(); }
                None
            }
        };
        return Ok(flush_guard)
    }

    /// Install the global subscriber: human-readable output on stderr filtered by `RUST_LOG`, plus
    /// newline-delimited JSON to `logfile` if one is given.  Keep the returned guard alive until
    /// the program exits or buffered JSON lines are lost.
    pub fn init_logging(logfile: Option<impl AsRef<Path>>) -> anyhow::Result<Option<WorkerGuard>> {
        return build_and_set_global_subscriber(logfile, false);
    }

    #[allow(dead_code)]
    pub fn init_test_logging(logfile: Option<impl AsRef<Path>>) -> Option<WorkerGuard> {
        return build_and_set_global_subscriber(logfile, true).ok().flatten();
    }
}
pub use logging_setup::*;


pub(crate) mod utils {
    use num;
    use std::ops::ShrAssign;

    /// Iterates over the indices of the set bits of an unsigned integer, lowest first.
    pub struct Biterator<B> {
        bits : B,
        ones : u32,
        next_index: u32,
    }

    impl<B : num::Unsigned + num::PrimInt> Biterator<B> {
        pub fn new(val : B) -> Self {
            Self{ bits: val, ones: 0, next_index: 0 }
        }
    }

    impl<B : num::Unsigned + num::Zero + num::PrimInt + ShrAssign + From<u32>> Iterator for Biterator<B> {
        type Item = u32;

        fn next(&mut self) -> Option<Self::Item> {
            if self.ones > 0 {
                let val = self.next_index;
                self.ones -= 1;
                self.next_index += 1;
                return Some(val);
            } else if self.bits.is_zero() {
                return None;
            } else {
                let nz = self.bits.trailing_zeros();
                self.bits >>= nz.into();
                self.next_index += nz;
                let no = (!self.bits).trailing_zeros();
                self.ones = no;
                // a run of ones reaching the top bit would shift by the full width
                if no >= B::zero().count_zeros() {
                    self.bits = B::zero();
                } else {
                    self.bits >>= no.into();
                }
                return self.next();
            }
        }
    }

    /// Expand the low `n` bits of `mask` into a 0/1 assignment vector.
    pub fn unpack_assignment(mask: u64, n: usize) -> Vec<u8> {
        let mut x = vec![0u8; n];
        for i in Biterator::new(mask) {
            x[i as usize] = 1;
        }
        return x
    }


    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn biterate() {
            fn get_inds(val : u64) -> Vec<u32> {
                return Biterator::new(val).collect();
            }

            assert_eq!(get_inds(0), Vec::<u32>::new());
            assert_eq!(get_inds(1), vec![0u32]);
            assert_eq!(get_inds(0b010101010101), vec![0,2,4,6,8,10]);
            assert_eq!(get_inds(0b01110010011), vec![0,1,4,7,8,9]);
            assert_eq!(get_inds(u64::MAX).len(), 64);
        }

        #[test]
        fn unpack() {
            assert_eq!(unpack_assignment(0b1001, 4), vec![1, 0, 0, 1]);
            assert_eq!(unpack_assignment(0, 3), vec![0, 0, 0]);
        }
    }
}
