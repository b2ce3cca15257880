//! Cross-cutting scenario tests for the prediction engine
