// Relayer
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_MAX_BATCH_SIZE: u64 = 10;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

// On-chain names
pub const DEFAULT_MAIN_CHAIN_NAME: &str = "main";
pub const DEFAULT_SYSTEM_CONTRACT: &str = "system";
pub const DEFAULT_GLOBAL_TABLE: &str = "global";
pub const DEFAULT_ACCEPT_HEADER_ACTION: &str = "acceptheader";
pub const DEFAULT_VOTE_COMMITTEE_ACTION: &str = "votecommittee";

// RPC
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_EXPIRE_IN_SECONDS: u32 = 60;
