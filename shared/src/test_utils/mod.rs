pub mod mock_auth;
pub mod mock_rsvp_store;
pub mod test_logging;
