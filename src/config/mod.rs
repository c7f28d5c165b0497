//! Configuration module

mod site;

pub use site::CmsConfig;
pub use site::ReadingConfig;
pub use site::SiteConfig;
