pub const MAX_FLOORS: usize = 256;
pub const MAX_SPOTS_PER_FLOOR: u64 = 100_000;
pub const MAX_PLATE_LEN: usize = 32;
