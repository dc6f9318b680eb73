//! Board-layer test suite.

mod make_unmake;
mod proptests;
mod see_exchange;
