//! Unit test suite

mod test_http;
mod test_poller;
