//! Chat gateway implementations for Memoh.
//!
//! All providers implement the `memoh_core::Provider` trait.
//! [`build_from_config`] selects one from the `[model]` config section.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
