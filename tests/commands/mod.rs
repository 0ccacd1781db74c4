//! Command-level integration tests

mod test_push;
