pub mod connection;
pub mod template_repository;

pub use connection::YamlConnection;
pub use template_repository::TemplateRepository;
