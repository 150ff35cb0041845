mod feed_view;
mod header;
mod status_bar;

pub use feed_view::{wrap_text, FeedViewWidget};
pub use header::HeaderWidget;
pub use status_bar::StatusBarWidget;
