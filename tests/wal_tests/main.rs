//! WAL test suite

mod writer_tests;
