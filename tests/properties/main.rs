//! Property-based test suite entry point.

mod metric_props;
mod scoring_props;
mod strategies;
