//! # meridian-agents
//!
//! Collaborator contracts and agent implementations for Meridian.
//!
//! The coordinator is generic over three traits (`Reviewer`, `Curator`,
//! `Proposer`) and this crate ships the default implementations:
//! - `OpenAiReviewer`: chat-completions peer review with typed JSON parsing
//! - `CatalogCurator`: keyword-relevance search over a built-in catalog
//! - `DryRunProposer`: synthetic receipts when no wallet is configured

mod catalog_curator;
mod dry_run_proposer;
mod openai_reviewer;
mod traits;

pub use catalog_curator::{builtin_catalog, CatalogCurator};
pub use dry_run_proposer::DryRunProposer;
pub use openai_reviewer::OpenAiReviewer;
pub use traits::{Curator, Proposer, Reviewer};
