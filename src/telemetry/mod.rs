pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

pub fn feed() -> LogCtx<ops::feed::Feed> { LogCtx::new(config::logs_are_json()) }
pub fn refresh() -> LogCtx<ops::refresh::Refresh> { LogCtx::new(config::logs_are_json()) }
pub fn serve() -> LogCtx<ops::serve::Serve> { LogCtx::new(config::logs_are_json()) }
pub fn init() -> LogCtx<ops::init::Init> { LogCtx::new(config::logs_are_json()) }
