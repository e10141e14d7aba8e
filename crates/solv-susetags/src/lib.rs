//! Decoder for the susetags package metadata format.
//!
//! Susetags is a line-oriented, tag-prefixed text format listing packages,
//! their dependencies and descriptive attributes:
//!
//! ```text
//! =Ver: 2.0
//! =Pkg: bash 5.1 3 x86_64
//! =Req: glibc >= 2.31
//! +Des:
//! The GNU Bourne Again shell.
//! -Des:
//! ```
//!
//! [`decode`] turns such a stream into solvables of a
//! [`solv_core::Repository`], interning names and relations in a shared
//! [`solv_core::Pool`]:
//!
//! ```
//! use solv_core::{Id, Pool, Repository};
//!
//! let mut pool = Pool::new();
//! let mut repo = Repository::new("oss");
//! let input = "=Pkg: foo 1.0 1 x86_64\n=Req: bar\n";
//! let stats = solv_susetags::decode(&mut pool, &mut repo, input.as_bytes(), Id::NULL, None)?;
//!
//! assert_eq!(stats.solvables_created, 1);
//! let foo = repo.solvable(0).unwrap();
//! assert_eq!(pool.str(foo.evr), "1.0-1");
//! # Ok::<(), solv_susetags::SusetagsError>(())
//! ```

pub mod config;
mod decoder;
mod dep;
pub mod error;
mod line;
pub mod location;
mod split;
mod tag;

pub use config::DecodeOptions;
pub use decoder::{decode, decode_with_options, DecodeStats, Decoded};
pub use error::{Result, SusetagsError};
pub use location::{media_file_name, Location};
