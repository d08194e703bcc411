pub mod draw;
pub mod route;
pub mod season;

pub use draw::{AssetId, DrawData, FlagUrls, Pot, Season, Team};
pub use route::{DrawView, RouteParams, SeasonChange, SeasonOption, season_options};
pub use season::{current_season, current_season_for};
