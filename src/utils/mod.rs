/// TOML configuration loading, interpolation and validation.
pub mod toml_config;
