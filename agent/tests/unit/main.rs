//! Unit test harness

mod test_gopro;
mod test_layout;
mod test_pacing;
mod test_settings;
mod test_similarity;
mod test_sources;
