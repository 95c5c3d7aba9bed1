//! Bot registry persistence port trait.

use crate::domain::bot::BotInfo;
use crate::domain::error::FxlabError;

pub trait RegistryPort {
    fn load(&self) -> Result<Vec<BotInfo>, FxlabError>;

    fn save(&self, records: &[BotInfo]) -> Result<(), FxlabError>;
}
