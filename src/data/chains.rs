//! Chain id to display name lookup

/// Known chain ids and their display names
const CHAIN_NAMES: [(u64, &str); 17] = [
    (0, "Farcaster"),
    (1, "Ethereum"),
    (10, "Optimism"),
    (137, "Polygon"),
    (1315, "Story Testnet"),
    (1514, "Story"),
    (2818, "Morph"),
    (5112, "Ham"),
    (8453, "Base"),
    (10143, "Arbitrum Nova"),
    (42161, "Arbitrum"),
    (84532, "Base Sepolia"),
    (325000, "Camp Network"),
    (7777777, "Zora"),
    (666666666, "Degen Chain"),
    (999999999, "Zora Testnet"),
    (123420001114, "Basecamp"),
];

/// Chain id used for Farcaster publishes, which is not an on-chain network
pub const FARCASTER_CHAIN_ID: u64 = 0;

/// Returns all known chains, ordered by id
pub fn known_chains() -> &'static [(u64, &'static str)] {
    &CHAIN_NAMES
}

/// Looks up the display name for a chain id
pub fn chain_name(id: u64) -> Option<&'static str> {
    CHAIN_NAMES
        .iter()
        .find(|(chain_id, _)| *chain_id == id)
        .map(|(_, name)| *name)
}

/// Display label for a chain id given as text, falling back to `Chain {id}`
pub fn chain_label(id: &str) -> String {
    id.trim()
        .parse::<u64>()
        .ok()
        .and_then(chain_name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Chain {}", id))
}
