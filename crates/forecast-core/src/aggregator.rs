use std::collections::HashMap;

use crate::{ticker, AggregatedEntry, PredictionRow, PricePoint};

struct CoinAccumulator<'a> {
    name: &'a str,
    running: f64,
    values: Vec<PricePoint>,
}

/// Group prediction rows per coin and rank the coins by growth rate.
///
/// The growth rate is a left fold of pairwise averages over the coin's
/// `close` values in row order: `v1 = c1`, `vi = (vi-1 + ci) / 2`.
/// Coins with equal rates keep their first-seen order.
pub fn aggregate_top_growth(rows: &[PredictionRow]) -> Vec<AggregatedEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut coins: Vec<CoinAccumulator> = Vec::new();

    for row in rows {
        match index.get(row.crypto_name.as_str()) {
            Some(&i) => {
                let coin = &mut coins[i];
                coin.running = (coin.running + row.close) / 2.0;
                coin.values.push(PricePoint::from(row));
            }
            None => {
                index.insert(row.crypto_name.as_str(), coins.len());
                coins.push(CoinAccumulator {
                    name: &row.crypto_name,
                    running: row.close,
                    values: vec![PricePoint::from(row)],
                });
            }
        }
    }

    coins.sort_by(|a, b| b.running.total_cmp(&a.running));

    coins
        .into_iter()
        .map(|coin| {
            let (code, img_url) = ticker::resolve(coin.name);
            AggregatedEntry {
                crypto_name: coin.name.to_string(),
                crypto_code: code.map(str::to_string),
                img_url,
                growth_rate: coin.running,
                values: coin.values,
            }
        })
        .collect()
}
