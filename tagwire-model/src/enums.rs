//! Enumerations. On the wire these are plain i32 fields.

/// Comparison in an `IndexExpression`.
pub mod index_operator {
    pub const EQ: i32 = 0;
    pub const GTE: i32 = 1;
    pub const GT: i32 = 2;
    pub const LTE: i32 = 3;
    pub const LT: i32 = 4;
}

/// Secondary index implementation of a `ColumnDef`.
pub mod index_type {
    pub const KEYS: i32 = 0;
    pub const CUSTOM: i32 = 1;
}

/// Compression applied to a CQL query string.
pub mod compression {
    pub const GZIP: i32 = 1;
    pub const NONE: i32 = 2;
}

/// Kind of a `CqlResult`.
pub mod cql_result_type {
    pub const ROWS: i32 = 1;
    pub const VOID: i32 = 2;
    pub const INT: i32 = 3;
}
