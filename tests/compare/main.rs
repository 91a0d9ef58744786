//! Comparison E2E tests
//!
//! Runs complete comparisons against in-process mock Elasticsearch servers
//! speaking the 5.x, 6.x and 7.x dialects.

mod mock_es;
