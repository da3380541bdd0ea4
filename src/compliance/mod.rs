//! Compliance module
//!
//! Decides whether a URL may be fetched (robots.txt) and what crawl delay the
//! site asks for, plus a best-effort scan for terms-of-service links.

mod checker;
mod tos;

pub use checker::{ComplianceChecker, ComplianceReport, ComplianceResult, ComplianceSource};
pub use tos::{find_tos_links, TosResult, TOS_FRAGMENTS};
