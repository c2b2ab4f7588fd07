//! Utility Module
//!
//! - [`interner`]: String interning for shader define names
//! - [`time`]: Frame clock
//!
//! # String Interning
//!
//! Interned strings (Symbols) compare in O(1):
//!
//! ```rust,ignore
//! use brush_particles::utils::interner;
//!
//! let sym1 = interner::intern("USE_POINTS");
//! let sym2 = interner::intern("USE_POINTS");
//! assert_eq!(sym1, sym2);
//! ```

pub mod interner;
pub mod time;

pub use interner::Symbol;
pub use time::Timer;
