//! Content module - turns CMS documents into display values

mod post;
mod reading_time;
pub mod richtext;

pub use post::{PostCard, PostPage, PostView, SectionView};
pub use reading_time::ReadingTime;
