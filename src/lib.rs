//! Configuration Manager client library.
//!
//! Lets a service register itself, pair with other services, and fetch its
//! configuration from the central Configuration Manager over HTTP/JSON. Also
//! ships the YAML config loader, the provider registry and service connector
//! used by services built on it, and storage connectors for Redis and MongoDB.

pub mod blocking;
pub mod client;
pub mod error;
pub mod http;
pub mod logging;
pub mod request;
pub mod service;
pub mod settings;
pub mod storage;
pub mod utils;
pub mod yaml_config;

pub use blocking::BlockingConfigurationManagerClient;
pub use client::{cancellable, ConfigurationManagerClient};
pub use error::{ConfigManagerError, Result};
pub use logging::init_logging;
pub use request::{
    json_schema_for, ConfigurationRequest, RequestKind, ServiceConfigurationRequest, ServicePairingRequest,
    ServiceRegistrationRequest,
};
pub use service::{ConnectionParams, ServiceConnector, ServiceProviders};
pub use settings::ClientSettings;
pub use storage::{DatabaseConnector, MongoConnector, RedisConnector, RedisElement, StorageError};
pub use yaml_config::{load_yaml_config, load_yaml_config_with_env};
