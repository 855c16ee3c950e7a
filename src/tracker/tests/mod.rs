//! Tracker integration tests, backed by an in-process memory fake.


mod enumerator_tests;
