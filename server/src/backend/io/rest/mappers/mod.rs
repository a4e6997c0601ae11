pub mod template_mapper;
