pub mod message;

/// 存活检查
pub async fn alive() -> &'static str {
    "Bot is alive!"
}
