use analysis_core::PriceUniverse;

/// Tickers whose profile lists one of `issuers`, in universe order.
/// An empty issuer list selects every profiled ticker.
pub fn tickers_for_issuers(universe: &PriceUniverse, issuers: &[String]) -> Vec<String> {
    universe
        .tickers()
        .iter()
        .filter(|ticker| {
            universe.profile(ticker).is_some_and(|profile| {
                issuers.is_empty()
                    || profile
                        .issuer
                        .as_ref()
                        .is_some_and(|issuer| issuers.iter().any(|i| i == issuer))
            })
        })
        .cloned()
        .collect()
}

/// Index tickers first, then funds; only tickers with prices, no duplicates.
pub fn display_tickers(universe: &PriceUniverse, index_tickers: &[String], funds: &[String]) -> Vec<String> {
    let mut display: Vec<String> = Vec::new();
    for ticker in index_tickers.iter().chain(funds) {
        if universe.contains(ticker) && !display.contains(ticker) {
            display.push(ticker.clone());
        }
    }
    display
}

/// Preferred tickers that are on display, in preferred order; falls back to
/// the first displayed ticker.
pub fn default_selection(display: &[String], preferred: &[String]) -> Vec<String> {
    let selected: Vec<String> = preferred
        .iter()
        .filter(|t| display.contains(t))
        .cloned()
        .collect();

    if selected.is_empty() {
        display.iter().take(1).cloned().collect()
    } else {
        selected
    }
}

/// First candidate present in the universe, then the declared benchmark of
/// the first selected ticker, then the first selected ticker itself.
pub fn default_benchmark(universe: &PriceUniverse, selected: &[String], candidates: &[String]) -> Option<String> {
    if let Some(candidate) = candidates.iter().find(|c| universe.contains(c)) {
        return Some(candidate.clone());
    }

    let first = selected.first()?;
    universe
        .profile(first)
        .and_then(|p| p.benchmark.clone())
        .filter(|b| universe.contains(b))
        .or_else(|| Some(first.clone()))
}
