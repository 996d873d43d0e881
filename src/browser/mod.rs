pub mod headless;
pub mod pool;
pub mod session;

pub use headless::{ChromiumSession, ChromiumSessionFactory};
pub use pool::{PoolExhausted, SessionPool};
pub use session::{eval_as, BrowserSession, SessionFactory};
