//! Static cryptocurrency name → ticker table and logo URLs.

const LOGO_BASE_URL: &str =
    "https://raw.githubusercontent.com/Pymmdrza/Cryptocurrency_Logos/mainx/PNG";

/// Logo used when a coin has no known ticker
pub const DEFAULT_LOGO_CODE: &str = "btc";

const CRYPTO_CODES: &[(&str, &str)] = &[
    ("Bitcoin", "BTC"),
    ("Litecoin", "LTC"),
    ("XRP", "XRP"),
    ("Dogecoin", "DOGE"),
    ("Monero", "XMR"),
    ("Stellar", "XLM"),
    ("Tether", "USDT"),
    ("Ethereum", "ETH"),
    ("Ethereum Classic", "ETC"),
    ("Maker", "MKR"),
    ("Basic Attention Token", "BAT"),
    ("EOS", "EOS"),
    ("Bitcoin Cash", "BCH"),
    ("BNB", "BNB"),
    ("TRON", "TRX"),
    ("Decentraland", "MANA"),
    ("Chainlink", "LINK"),
    ("Cardano", "ADA"),
    ("Filecoin", "FIL"),
    ("Theta Network", "THETA"),
    ("Huobi Token", "HT"),
    ("Ravencoin", "RVN"),
    ("Tezos", "XTZ"),
    ("VeChain", "VET"),
    ("Quant", "QNT"),
    ("USD Coin", "USDC"),
    ("Cronos", "CRO"),
    ("Wrapped Bitcoin", "WBTC"),
    ("Cosmos", "ATOM"),
    ("Polygon", "MATIC"),
    ("OKB", "OKB"),
    ("UNUS SED LEO", "LEO"),
    ("Algorand", "ALGO"),
    ("Chiliz", "CHZ"),
    ("THORChain", "RUNE"),
    ("Terra Classic", "LUNA"),
    ("FTX Token", "FTT"),
    ("Hedera", "HBAR"),
    ("Binance USD", "BUSD"),
    ("Dai", "DAI"),
    ("Solana", "SOL"),
    ("Avalanche", "AVAX"),
    ("Shiba Inu", "SHIB"),
    ("The Sandbox", "SAND"),
    ("Polkadot", "DOT"),
    ("Elrond", "EGLD"),
    ("Uniswap", "UNI"),
    ("Aave", "AAVE"),
    ("NEAR Protocol", "NEAR"),
    ("Flow", "FLOW"),
    ("Internet Computer", "ICP"),
    ("Casper", "CSPR"),
    ("Toncoin", "TON"),
    ("Chain", "CHN"),
    ("ApeCoin", "APE"),
    ("Aptos", "APT"),
];

/// Ticker code for a display name, `None` if the coin is not in the table.
pub fn crypto_code(name: &str) -> Option<&'static str> {
    CRYPTO_CODES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Display names known to the table, in table order.
pub fn supported_names() -> impl Iterator<Item = &'static str> {
    CRYPTO_CODES.iter().map(|(name, _)| *name)
}

/// Logo URL for a ticker code, falling back to the Bitcoin logo.
pub fn image_url(code: Option<&str>) -> String {
    let file = code
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| DEFAULT_LOGO_CODE.to_string());
    format!("{}/{}.png", LOGO_BASE_URL, file)
}

/// Resolve both the code and the logo for a coin, logging unknown names.
pub fn resolve(name: &str) -> (Option<&'static str>, String) {
    let code = crypto_code(name);
    if code.is_none() {
        tracing::warn!("No ticker code for '{}', using default logo", name);
    }
    (code, image_url(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_table_entry_resolves() {
        for (name, code) in CRYPTO_CODES {
            assert_eq!(crypto_code(name), Some(*code), "lookup for {}", name);
        }
        assert_eq!(CRYPTO_CODES.len(), 56);
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(crypto_code("Bitcoin"), Some("BTC"));
        assert_eq!(crypto_code("Terra Classic"), Some("LUNA"));
        assert_eq!(crypto_code("Chain"), Some("CHN"));
        assert_eq!(crypto_code("UNUS SED LEO"), Some("LEO"));
        assert_eq!(crypto_code("Binance USD"), Some("BUSD"));
        assert_eq!(crypto_code("Toncoin"), Some("TON"));
        assert_eq!(crypto_code("Aptos"), Some("APT"));
    }

    #[test]
    fn test_table_names_are_unique() {
        let names: HashSet<_> = supported_names().collect();
        assert_eq!(names.len(), CRYPTO_CODES.len());
    }

    #[test]
    fn test_unknown_names_are_not_found() {
        assert_eq!(crypto_code("Notacoin"), None);
        assert_eq!(crypto_code("bitcoin"), None);
        assert_eq!(crypto_code(""), None);
    }

    #[test]
    fn test_image_url_lowercases_and_defaults() {
        assert_eq!(
            image_url(Some("DOGE")),
            "https://raw.githubusercontent.com/Pymmdrza/Cryptocurrency_Logos/mainx/PNG/doge.png"
        );
        assert!(image_url(None).ends_with("/btc.png"));
    }

    #[test]
    fn test_resolve_unknown_coin_degrades() {
        let (code, url) = resolve("Mystery Coin");
        assert_eq!(code, None);
        assert!(url.ends_with("/btc.png"));

        let (code, url) = resolve("Ethereum");
        assert_eq!(code, Some("ETH"));
        assert!(url.ends_with("/eth.png"));
    }
}
