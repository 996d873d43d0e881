//! 采集层：驱动浏览器，从评论页面提取 [`ReviewRecord`](crate::models::ReviewRecord)

pub mod controller;
pub mod rating;
pub mod scripts;
pub mod selectors;

pub use controller::{
    AcquisitionController, AcquisitionSettings, AcquisitionState, MAX_REVIEWS_CAP,
};
pub use rating::parse_rating_label;
pub use selectors::SelectorContract;
