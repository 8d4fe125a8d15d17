// libs/shared/utils/src/lib.rs
//
// In-memory persistence doubles and fixture builders shared by every cell's
// test suite. Not for production wiring.

pub mod test_utils;
