//! ftree Core Types and Definitions
//!
//! This crate provides the foundational types for ftree's genealogy model:
//!
//! - **Identifiers**: Interned cross-reference ids ([`identifier::Xref`])
//! - **Dates**: Tri-state event dates ([`date::DateValue`])
//! - **Model**: Individuals, families, events ([`model`] module)
//! - **Graph**: The id-keyed arena holding a loaded file ([`graph::FamilyGraph`])
//! - **Spans**: Source locations ([`span`] module)

pub mod date;
pub mod graph;
pub mod identifier;
pub mod model;
pub mod span;
