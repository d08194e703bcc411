pub mod args;
pub mod model;
pub mod controller {
    pub mod assets;
    pub mod draw;
    pub mod router;
    pub mod season;
}
pub mod mvu {
    pub mod error;
    pub mod runtime;
    pub mod season;
}
pub mod view {
    pub mod status;
}

pub use args::ControllerConfig;
pub use controller::season::SeasonDataController;
pub use mvu::error::{AssetError, FetchError};
pub use mvu::season::{Deps, RenderKey, Snapshot, Status};
pub use view::status::Presentation;
