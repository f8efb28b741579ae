/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms, collision-free at storefront scale)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Generate a human-readable order number, e.g. `ORD-20250806-4F3A9C`.
///
/// Uniqueness is enforced by the database; the random suffix makes
/// collisions within one day vanishingly unlikely.
pub fn order_number() -> String {
    use rand::Rng;
    let date = chrono::Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen_range(0..0xFF_FFFF);
    format!("ORD-{}-{:06X}", date, suffix)
}
