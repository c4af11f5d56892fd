//! 関心プロファイルの更新と減衰。
mod decay;
mod locations;
mod updater;

pub use decay::{decay, decay_in_place};
pub use locations::LocationCatalog;
pub use updater::ProfileUpdater;
