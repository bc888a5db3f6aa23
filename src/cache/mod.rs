// 进程内缓存
// 目前只有飞书租户访问令牌

pub mod token;

pub use token::{AccessToken, Clock, SystemClock, TokenCache};
