//! MySQL repository implementations

mod row;
pub mod token_repository_impl;
pub mod user_repository_impl;

pub use token_repository_impl::MySqlTokenRepository;
pub use user_repository_impl::MySqlUserRepository;
