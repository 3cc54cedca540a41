use crate::QueryError;
use serde::Serialize;
use std::num::Wrapping;

/// djb2 over the query text. Used as the `query_key` of an operation.
pub fn hash_query(query: &str) -> u32 {
    let mut h = Wrapping(5381u32);
    for byte in query.bytes() {
        h = (h << 5) + h + Wrapping(byte as u32);
    }
    h.0
}

/// When we have separate values it's useful to run a progressive
/// version of djb2 where we pretend that we're still looping over
/// the same value
pub fn progressive_hash<V: Serialize>(h: u32, x: &V) -> Result<u64, QueryError> {
    let x = bincode::serialize(x)?;

    let mut h = Wrapping(h as u64);

    for byte in x {
        h = (h << 5) + h + Wrapping(byte as u64)
    }

    Ok(h.0)
}
