//! Game-balance curves.
//!
//! Each curve is a table for the low levels and a linear (usually capped)
//! formula above it. The numbers come straight from the game and must not
//! be smoothed.

/// Highest level a planet of the given tier can reach.
pub fn max_level(tier: u8) -> u32 {
    match tier {
        1 => 15,
        2 => 20,
        3 => 35,
        4 => 50,
        _ => 0,
    }
}

/// Credits needed to upgrade from `level` to `level + 1`.
pub fn upgrade_cost(level: i64) -> u64 {
    const LOW: [u64; 8] = [0, 50, 200, 400, 800, 2_000, 4_000, 8_000];
    const MID: [u64; 6] = [250, 300, 400, 500, 600, 800];

    match level {
        l if l < 0 => 0,
        0..=7 => LOW[level as usize],
        8..=12 => 10_000 * (level as u64 - 7),
        13..=18 => 25_000 * (level as u64 - 10),
        19..=24 => MID[(level - 19) as usize] * 1_000,
        25..=32 => 250_000 * (level as u64 - 21),
        33..=49 => 500_000 * (level as u64 - 27),
        _ => 0,
    }
}

/// Seconds an upgrade from `level` takes.
pub fn upgrade_duration(level: i64) -> i64 {
    const MINUTES: [i64; 10] = [1, 2, 5, 20, 60, 240, 480, 960, 1_440, 2_160];
    const CAP_MINUTES: i64 = 14 * 24 * 60;

    let minutes = match level {
        l if l < 3 => 0,
        3..=12 => MINUTES[(level - 3) as usize],
        _ => (720 * (level - 8)).min(CAP_MINUTES),
    };
    minutes * 60
}

/// Credit storage a planet provides at `level`.
pub fn credit_storage(level: i64) -> u64 {
    const LOW: [u64; 18] = [
        0, 1_000, 1_400, 1_800, 3_000, 4_000, 5_000, 6_000, 7_500, 10_000, 13_000, 16_000,
        20_000, 24_000, 28_000, 35_000, 45_000, 65_000,
    ];

    match level {
        l if l < 0 => 0,
        0..=17 => LOW[level as usize],
        _ => (40_000 * (level as u64 - 16) + 10_000).min(1_370_000),
    }
}

/// Hydro storage a planet provides at `level`.
///
/// Fire planets provide none; that is applied by callers summing a
/// player's capacity, not here.
pub fn hydro_storage(level: i64) -> u64 {
    const LOW: [u64; 20] = [
        0, 200, 260, 340, 450, 570, 750, 960, 1_250, 1_600, 2_100, 2_750, 3_600, 5_000, 7_000,
        9_000, 11_000, 13_000, 15_000, 17_000,
    ];

    match level {
        l if l < 0 => 0,
        0..=19 => LOW[level as usize],
        _ => (1_000 * (level as u64 - 1)).min(49_000),
    }
}
