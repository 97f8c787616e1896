pub mod loaders;
pub mod lottery;

pub use loaders::{load_all_applications, load_application, save_application};
pub use lottery::{
    required_field, LotteryApplication, LotteryResult, LotteryStatus, LotteryVariant,
};
