/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate the human-facing 8-digit booking group id.
///
/// Uniform over [10_000_000, 99_999_999]. No uniqueness probe is made
/// against existing bookings; the id is customer-visible lookup sugar, the
/// store document id remains the real key.
pub fn booking_group_id() -> u32 {
    use rand::Rng;
    rand::thread_rng().gen_range(10_000_000..=99_999_999)
}
