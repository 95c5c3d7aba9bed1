//! Configuration storage port trait.

use crate::domain::config::AppConfig;
use crate::domain::error::FxlabError;

pub trait ConfigPort {
    /// Load the configuration, creating a default one if none is stored yet.
    fn load(&self) -> Result<AppConfig, FxlabError>;

    fn save(&self, config: &AppConfig) -> Result<(), FxlabError>;
}
