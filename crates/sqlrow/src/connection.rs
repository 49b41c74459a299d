//! The connection boundary.
//!
//! Record operations are generic over [`Connection`], so any backend that can
//! execute plain statement text and report its dialect family can drive the
//! mapper. Bundled implementations live behind the `sqlite` and `mysql`
//! features; tests script a mock.

use crate::dialect::Dialect;
use crate::error::MapperResult;
use crate::row::Rows;

/// An open, dialect-tagged database connection.
///
/// All statement text produced by this crate is plain SQL assembled by
/// concatenation with primitive-class escaping; implementations are expected
/// to execute it verbatim. Implementations wrapping a driver with parameter
/// binding should still pass the text through unchanged, and use binding for
/// their own statements where they can: binding is the stronger strategy,
/// this crate's escaping is the portable fallback.
///
/// A connection is exclusively borrowed by one record operation at a time;
/// the model is single-threaded and blocking. Timeouts and cancellation are
/// the implementation's concern, not the mapper's.
pub trait Connection {
    /// The dialect family this connection speaks, fixed at construction.
    fn dialect(&self) -> Dialect;

    /// Execute a statement that returns no rows; reports affected rows.
    fn execute(&mut self, sql: &str) -> MapperResult<u64>;

    /// Execute a statement that returns rows.
    fn query(&mut self, sql: &str) -> MapperResult<Rows>;

    /// Identity generated by the last insert, if the backend produced one.
    fn last_insert_id(&mut self) -> MapperResult<Option<i64>>;
}
