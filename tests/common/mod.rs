pub mod http;
pub mod mock_openai;
pub mod mock_twitter;
