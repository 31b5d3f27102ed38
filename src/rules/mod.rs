//! Surface-rule restriction of the machine's action space.
//!
//! A surface alignment evidences gold nodes at token positions. Inverting
//! it gives, for every position, the node actions "available" there
//! ([`SurfaceRuleIndex`]); the complement — actions evidenced only at
//! strictly later positions — must not be chosen early.
//! [`restrict_actions`] applies both restrictions to the machine's valid
//! actions, failing open whenever a restriction would leave no choice.

pub mod filter;
pub mod index;

pub use filter::restrict_actions;
pub use index::SurfaceRuleIndex;
