pub const CIVIC: &'static str = "gatem74V238djXdzWnJf94Wo1DcnuGkfijbf3AuBhfs";

pub const DEFAULT_RPC_URL: &'static str = "https://api.mainnet-beta.solana.com";

/// Environment variable consulted when no candy machine address is passed in.
pub const CANDY_MACHINE_ENV: &'static str = "CANDY_MACHINE_ID";

pub const MINT_LAYOUT: u64 = 82;

pub const LOOKING_GLASS_EMOJI: &str = "🔍 ";
pub const CANDY_EMOJI: &str = "🍬 ";
pub const COMPLETE_EMOJI: &str = "✅ ";
pub const CONFETTI_EMOJI: &str = "🎉 ";
pub const ERROR_EMOJI: &str = "🛑 ";
pub const WARNING_EMOJI: &str = "⚠️  ";
