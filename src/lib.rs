//! `rematch` adapts native regular-expression engines to a generic matcher
//! interface, so that calling code can swap regex backends without changing
//! call sites.
//!
//! The contract is three object-safe traits: an [`Engine`] compiles patterns
//! into [`Regexp`] trait objects, and a successful search yields a [`Matcher`]
//! cursor over successive matches with capture-group access by index or name.
//! Global search-and-replace follows Java `Matcher.replaceAll` template
//! semantics (`\X` escapes, `$N` group references).
//!
//! Two backends ship with the crate: [`re2::Re2Engine`] wrapping the linear-time
//! `regex` crate, and [`pcre::PcreEngine`] wrapping the backtracking
//! `fancy-regex` crate. Each sits behind a cargo feature of the same name.
//!
//! # Examples
//!
//! ```
//! use rematch::prelude::*;
//!
//! let engine = Re2Engine;
//! let re = engine.compile(r"(\d{4})-(\d{2})-(\d{2})", 0).unwrap();
//!
//! assert_eq!(re.replace("2023-01-02", "$3/$2/$1").unwrap(), "02/01/2023");
//!
//! let mut m = re.search("from 2023-01-02 to 2024-03-04").unwrap();
//! assert_eq!(m.group(1), "2023");
//! assert!(m.next());
//! assert_eq!(m.group(1), "2024");
//! assert!(!m.next());
//! ```
#![deny(missing_docs, rust_2018_idioms)]
#![cfg_attr(test, deny(warnings))]

mod error;
mod matcher;
mod template;

#[cfg(feature = "pcre")]
pub mod pcre;
#[cfg(feature = "re2")]
pub mod re2;

pub use crate::error::{Error, Result};
pub use crate::matcher::{Engine, Matcher, Regexp};

/// The `rematch` prelude
pub mod prelude {
    pub use crate::{Engine, Error, Matcher, Regexp, Result};

    #[cfg(feature = "pcre")]
    pub use crate::pcre::PcreEngine;
    #[cfg(feature = "re2")]
    pub use crate::re2::Re2Engine;
}
