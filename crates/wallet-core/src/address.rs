//! Address Classification
//!
//! A wallet address is never parsed into chain-specific types; its raw
//! string format alone decides which chain families are worth querying.
//! `classify` is permissive (fan-out candidates), `is_valid_address` is the
//! strict gate applied before any network call.

use crate::chains::Chain;

/// Determine which chains an address is syntactically compatible with.
///
/// Pure and infallible; returns an empty set when nothing matches. A single
/// address can match multiple families (a 0x address is a candidate on
/// every EVM chain).
pub fn classify(address: &str) -> Vec<Chain> {
    let mut chains = Vec::new();

    // EVM: 0x prefix + 40 hex chars
    if is_evm_address(address) {
        chains.extend(Chain::EVM);
    }

    // Solana: base58, 32-44 chars, no 0x prefix
    if !address.starts_with("0x")
        && (32..=44).contains(&address.len())
        && address.chars().all(is_base58_char)
    {
        chains.push(Chain::Solana);
    }

    // Bitcoin legacy or bech32
    if is_bitcoin_legacy(address) || is_bitcoin_bech32(address) {
        chains.push(Chain::Bitcoin);
    }

    // 0x-prefixed strings of unusual length still fan out to the main pair
    if chains.is_empty() && address.starts_with("0x") {
        chains.push(Chain::Ethereum);
        chains.push(Chain::Polygon);
    }

    tracing::debug!(address = %truncate(address), chains = ?chains, "classified address");
    chains
}

/// Strict validity predicate: Ethereum-style or Solana-style format.
///
/// Used to reject malformed input with a client error before any fetch is
/// attempted. Deliberately narrower than `classify`.
pub fn is_valid_address(address: &str) -> bool {
    is_evm_address(address)
        || ((32..=44).contains(&address.len()) && address.chars().all(is_base58_char))
}

/// `^0x[a-fA-F0-9]{40}$`
fn is_evm_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Base58 alphabet: 1-9, A-H, J-N, P-Z, a-k, m-z (no 0, I, O, l)
fn is_base58_char(c: char) -> bool {
    matches!(c, '1'..='9' | 'A'..='H' | 'J'..='N' | 'P'..='Z' | 'a'..='k' | 'm'..='z')
}

/// `^[13][base58]{25,34}$`
fn is_bitcoin_legacy(address: &str) -> bool {
    let mut chars = address.chars();
    matches!(chars.next(), Some('1' | '3'))
        && (26..=35).contains(&address.len())
        && chars.all(is_base58_char)
}

/// `^bc1[a-z0-9]{39,59}$`
fn is_bitcoin_bech32(address: &str) -> bool {
    match address.strip_prefix("bc1") {
        Some(rest) => {
            (39..=59).contains(&rest.len())
                && rest.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        }
        None => false,
    }
}

/// Shorten an address for log lines
fn truncate(address: &str) -> String {
    address.chars().take(10).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETH_ADDR: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
    const SOL_ADDR: &str = "DYw8jCTfwHNRJhhmFcbXvVDTqWMEVFBX6ZKUmG5CNSKK";

    #[test]
    fn test_evm_address_gets_full_evm_family() {
        let chains = classify(ETH_ADDR);
        assert_eq!(chains, Chain::EVM.to_vec());
    }

    #[test]
    fn test_solana_address_gets_solana_only() {
        let chains = classify(SOL_ADDR);
        assert_eq!(chains, vec![Chain::Solana]);
    }

    #[test]
    fn test_bitcoin_legacy() {
        let chains = classify("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
        assert!(chains.contains(&Chain::Bitcoin));
    }

    #[test]
    fn test_bitcoin_bech32() {
        let chains = classify("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq");
        assert!(chains.contains(&Chain::Bitcoin));
    }

    #[test]
    fn test_0x_fallback_for_odd_lengths() {
        // Not a valid EVM address, but 0x-prefixed
        let chains = classify("0x1234");
        assert_eq!(chains, vec![Chain::Ethereum, Chain::Polygon]);
    }

    #[test]
    fn test_garbage_yields_empty_set() {
        assert!(classify("not-an-address").is_empty());
        assert!(classify("").is_empty());
    }

    #[test]
    fn test_valid_addresses_accepted() {
        assert!(is_valid_address(ETH_ADDR));
        assert!(is_valid_address(SOL_ADDR));
        assert!(is_valid_address("0x1111111111111111111111111111111111111111"));
    }

    #[test]
    fn test_invalid_addresses_rejected() {
        assert!(!is_valid_address("not-an-address"));
        assert!(!is_valid_address("0x1234")); // too short
        assert!(!is_valid_address("0xZZZZ35Cc6634C0532925a3b844Bc454e4438f44e")); // bad hex
        assert!(!is_valid_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44e00")); // too long
        assert!(!is_valid_address("short")); // below base58 length floor
        assert!(!is_valid_address("")); // empty
        // 0 and O are outside the base58 alphabet
        assert!(!is_valid_address("0O0O0O0O0O0O0O0O0O0O0O0O0O0O0O0O0O"));
    }

    #[test]
    fn test_base58_excludes_ambiguous_chars() {
        for c in ['0', 'I', 'O', 'l'] {
            assert!(!is_base58_char(c));
        }
        for c in ['1', '9', 'A', 'H', 'J', 'N', 'P', 'Z', 'a', 'k', 'm', 'z'] {
            assert!(is_base58_char(c));
        }
    }

    #[test]
    fn test_classify_never_panics_on_unicode() {
        assert!(classify("日本語アドレス").is_empty());
    }
}
