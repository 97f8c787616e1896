pub mod chromium_driver;
pub mod page_driver;

pub use chromium_driver::ChromiumDriver;
pub use page_driver::PageDriver;
