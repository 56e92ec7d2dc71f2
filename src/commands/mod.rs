mod assets_cmd;
mod config_cmd;
mod list_cmd;
mod sync_cmd;

pub use assets_cmd::AssetsCommand;
pub use config_cmd::ConfigCommand;
pub use list_cmd::ListCommand;
pub use sync_cmd::SyncCommand;
