//! Request Report Core — request capability trait, report fragment builder,
//! and delimited configuration list parsing.

pub mod builder;
pub mod delimited;
pub mod error;
pub mod filter;
pub mod report;
pub mod source;

pub use builder::{ReportRouter, RequestReportBuilder};
pub use delimited::parse_delimited_list;
pub use error::ReportError;
pub use filter::{ReportFilter, FILTERED};
pub use report::{CgiData, Params, ReportFragment};
pub use source::{PartReadError, RequestPart, RequestSource};
