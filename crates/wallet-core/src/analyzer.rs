//! Query Analyzer
//!
//! Rule-based natural-language analysis over an aggregated portfolio.
//! No inference, no I/O: the query is classified into an intent by ordered
//! keyword matching and each intent recomputes its aggregates from the
//! portfolio document. The analyzer never fails - unmatched intents fall
//! through to static help text.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::model::{Holding, HoldingKind, Portfolio};

/// Recognized query intents, in match priority order.
///
/// The order is a contract: a query containing keywords of several intents
/// resolves to the highest-priority one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryIntent {
    Diversification,
    Risk,
    Performance,
    Recommendations,
    Summary,
    Help,
}

/// Keyword table evaluated first-match-wins, top to bottom
const INTENT_KEYWORDS: &[(QueryIntent, &[&str])] = &[
    (
        QueryIntent::Diversification,
        &["diversification", "diversity", "spread"],
    ),
    (QueryIntent::Risk, &["risk", "exposure", "danger"]),
    (
        QueryIntent::Performance,
        &["performance", "gains", "profit", "top", "best", "biggest", "largest"],
    ),
    (
        QueryIntent::Recommendations,
        &["recommendations", "advice", "suggest", "should"],
    ),
    (QueryIntent::Summary, &["summary", "overview", "status"]),
];

/// Classify a free-text query into an intent
pub fn classify_intent(query: &str) -> QueryIntent {
    let lower = query.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *intent;
        }
    }
    QueryIntent::Help
}

/// Product-tuning cutoffs for the analysis reports.
///
/// Observed behavior constants, kept as configuration rather than inline
/// literals so they can be adjusted without touching report logic.
#[derive(Clone, Debug)]
pub struct AnalyzerThresholds {
    /// Risk bucket: dust ceiling (exclusive lower bound is zero)
    pub dust_ceiling: Decimal,
    /// Risk bucket: small position ceiling
    pub small_ceiling: Decimal,
    /// Risk bucket: medium position ceiling
    pub medium_ceiling: Decimal,
    /// Risk bucket: high-value ceiling; above this is a whale position
    pub high_ceiling: Decimal,
    /// Chain dominance above this percentage is high concentration
    pub chain_high_concentration_pct: Decimal,
    /// Chain dominance below this percentage is well diversified
    pub chain_diversified_pct: Decimal,
    /// Top-3 concentration above this percentage is high
    pub top3_high_pct: Decimal,
    /// Top-3 concentration above this percentage is moderate
    pub top3_moderate_pct: Decimal,
    /// Token contract count above this is high smart-contract risk
    pub contract_high_count: usize,
    /// Token contract count above this is medium smart-contract risk
    pub contract_medium_count: usize,
    /// Recommendations: holdings at or below this value count as dust
    pub dust_value: Decimal,
    /// Recommendations: dust count that triggers cleanup advice
    pub dust_cleanup_count: usize,
    /// Recommendations: dominant share that triggers rebalance advice
    pub rebalance_share: Decimal,
    /// Recommendations: totals below this trigger accumulation advice
    pub accumulate_total: Decimal,
    /// Recommendations: totals above this trigger cold-storage advice
    pub secure_total: Decimal,
}

impl Default for AnalyzerThresholds {
    fn default() -> Self {
        Self {
            dust_ceiling: dec!(1),
            small_ceiling: dec!(100),
            medium_ceiling: dec!(1000),
            high_ceiling: dec!(10000),
            chain_high_concentration_pct: dec!(70),
            chain_diversified_pct: dec!(40),
            top3_high_pct: dec!(80),
            top3_moderate_pct: dec!(60),
            contract_high_count: 20,
            contract_medium_count: 10,
            dust_value: dec!(5),
            dust_cleanup_count: 15,
            rebalance_share: dec!(0.6),
            accumulate_total: dec!(1000),
            secure_total: dec!(50000),
        }
    }
}

/// Deterministic portfolio analyst
#[derive(Clone, Debug, Default)]
pub struct QueryAnalyzer {
    thresholds: AnalyzerThresholds,
}

impl QueryAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: AnalyzerThresholds) -> Self {
        Self { thresholds }
    }

    /// Produce a textual report for a query against a portfolio.
    ///
    /// Pure function of its inputs. A missing portfolio degrades to an
    /// explanatory message rather than an error.
    pub fn analyze(&self, portfolio: Option<&Portfolio>, query: &str) -> String {
        let Some(portfolio) = portfolio else {
            return "Please load a wallet first - enter a wallet address to fetch \
                    its portfolio, then ask me about it."
                .into();
        };

        let holdings = portfolio.flatten();
        let total: Decimal = holdings.iter().map(|h| h.usd_value).sum();
        let intent = classify_intent(query);
        tracing::debug!(?intent, total = %total, "analyzing portfolio query");

        match intent {
            QueryIntent::Diversification => self.diversification_report(&holdings, total),
            QueryIntent::Risk => self.risk_report(&holdings, total),
            QueryIntent::Performance => self.performance_report(&holdings, total),
            QueryIntent::Recommendations => self.recommendations_report(&holdings, total),
            QueryIntent::Summary => Self::summary_report(portfolio, &holdings, total),
            QueryIntent::Help => Self::help_text(total),
        }
    }

    fn diversification_report(&self, holdings: &[Holding], total: Decimal) -> String {
        // Per-chain USD distribution, descending by value
        let mut by_chain: Vec<(String, Decimal)> = Vec::new();
        let mut native_value = Decimal::ZERO;
        let mut token_value = Decimal::ZERO;

        for holding in holdings {
            match by_chain.iter_mut().find(|(chain, _)| *chain == holding.chain) {
                Some((_, value)) => *value += holding.usd_value,
                None => by_chain.push((holding.chain.clone(), holding.usd_value)),
            }
            match holding.kind {
                HoldingKind::Native => native_value += holding.usd_value,
                HoldingKind::Token => token_value += holding.usd_value,
            }
        }
        by_chain.sort_by(|a, b| b.1.cmp(&a.1));

        let mut report = String::from("🔍 Portfolio Diversification Analysis\n\n");
        report.push_str(&format!("💰 Total Portfolio Value: ${:.2}\n\n", total));
        report.push_str("📊 Chain Distribution:\n");
        for (chain, value) in &by_chain {
            report.push_str(&format!(
                "{}: ${:.2} ({:.1}%)\n",
                chain.to_uppercase(),
                value,
                percent_of(*value, total)
            ));
        }

        report.push_str(&format!(
            "\n💎 Asset Types:\n• Native coins: ${:.2} ({:.1}%)\n• Tokens: ${:.2} ({:.1}%)\n",
            native_value,
            percent_of(native_value, total),
            token_value,
            percent_of(token_value, total)
        ));

        if let Some((dominant, value)) = by_chain.first() {
            let share = percent_of(*value, total);
            if share > self.thresholds.chain_high_concentration_pct {
                report.push_str(&format!(
                    "\n⚠️ HIGH CONCENTRATION RISK: {} represents {:.1}% of your portfolio. \
                     Consider diversifying!",
                    dominant.to_uppercase(),
                    share
                ));
            } else if share < self.thresholds.chain_diversified_pct {
                report.push_str("\n✅ WELL DIVERSIFIED: Good distribution across multiple chains!");
            } else {
                report.push_str(&format!(
                    "\n⚖️ MODERATE CONCENTRATION: {} dominance is reasonable at {:.1}%",
                    dominant.to_uppercase(),
                    share
                ));
            }
        }

        report
    }

    fn risk_report(&self, holdings: &[Holding], total: Decimal) -> String {
        let t = &self.thresholds;
        let whale: Vec<&Holding> = holdings.iter().filter(|h| h.usd_value > t.high_ceiling).collect();
        let high: Vec<&Holding> = holdings
            .iter()
            .filter(|h| h.usd_value > t.medium_ceiling && h.usd_value <= t.high_ceiling)
            .collect();
        let medium = holdings
            .iter()
            .filter(|h| h.usd_value > t.small_ceiling && h.usd_value <= t.medium_ceiling)
            .count();
        let small = holdings
            .iter()
            .filter(|h| h.usd_value > t.dust_ceiling && h.usd_value <= t.small_ceiling)
            .count();
        let dust = holdings
            .iter()
            .filter(|h| h.usd_value > Decimal::ZERO && h.usd_value <= t.dust_ceiling)
            .count();

        let mut report = String::from("⚠️ Risk & Exposure Analysis\n\n");
        report.push_str(&format!("💰 Total at Risk: ${:.2}\n\n", total));
        report.push_str(&format!("🐋 Whale positions (>${}): {}\n", t.high_ceiling, whale.len()));
        report.push_str(&format!(
            "💎 High-value positions (${}-${}): {}\n",
            t.medium_ceiling,
            t.high_ceiling,
            high.len()
        ));
        report.push_str(&format!(
            "💰 Medium positions (${}-${}): {}\n",
            t.small_ceiling, t.medium_ceiling, medium
        ));
        report.push_str(&format!(
            "💵 Small positions (${}-${}): {}\n",
            t.dust_ceiling, t.small_ceiling, small
        ));
        report.push_str(&format!("🗑️ Dust positions (<${}): {}\n", t.dust_ceiling, dust));

        let mut major: Vec<&Holding> = whale.iter().chain(high.iter()).copied().collect();
        major.sort_by(|a, b| b.usd_value.cmp(&a.usd_value));
        if !major.is_empty() {
            report.push_str("\n⚡ MAJOR RISK EXPOSURES:\n");
            for (index, holding) in major.iter().take(5).enumerate() {
                let marker = if holding.usd_value > t.high_ceiling { "🔴" } else { "🟡" };
                report.push_str(&format!(
                    "{} {}. {:.4} {} = ${:.2} ({})\n",
                    marker,
                    index + 1,
                    holding.balance,
                    holding.symbol,
                    holding.usd_value,
                    holding.chain
                ));
            }
        }

        let contract_count = holdings.iter().filter(|h| h.kind == HoldingKind::Token).count();
        if contract_count > 0 {
            report.push_str(&format!(
                "\n🔒 Smart Contract Risk: {} token contracts\n",
                contract_count
            ));
            if contract_count > t.contract_high_count {
                report.push_str("⚠️ HIGH: Many token contracts increase smart contract risk");
            } else if contract_count > t.contract_medium_count {
                report.push_str("⚖️ MEDIUM: Moderate token diversification");
            } else {
                report.push_str("✅ LOW: Conservative token exposure");
            }
        }

        report
    }

    fn performance_report(&self, holdings: &[Holding], total: Decimal) -> String {
        let mut active: Vec<&Holding> =
            holdings.iter().filter(|h| h.usd_value > Decimal::ZERO).collect();
        active.sort_by(|a, b| b.usd_value.cmp(&a.usd_value));

        let mut report = String::from("📈 Performance Insights\n\n");
        report.push_str(&format!("💰 Current Portfolio Value: ${:.2}\n", total));
        report.push_str(&format!("📊 Active Positions: {}\n\n", active.len()));

        report.push_str("🏆 TOP HOLDINGS BY VALUE:\n");
        for (index, holding) in active.iter().take(10).enumerate() {
            let price = holding.price_usd();
            let price_info = if price > Decimal::ZERO {
                if price < Decimal::ONE {
                    format!(" @ ${:.6}", price)
                } else {
                    format!(" @ ${:.2}", price)
                }
            } else {
                String::new()
            };
            report.push_str(&format!(
                "{}. {:.4} {}{} = ${:.2} ({:.1}%)\n",
                index + 1,
                holding.balance,
                holding.symbol,
                price_info,
                holding.usd_value,
                percent_of(holding.usd_value, total)
            ));
        }

        let top3: Decimal = active.iter().take(3).map(|h| h.usd_value).sum();
        let concentration = percent_of(top3, total);
        report.push_str(&format!(
            "\n📊 Portfolio Concentration:\nTop 3 holdings: {:.1}% of total value\n",
            concentration
        ));
        if concentration > self.thresholds.top3_high_pct {
            report.push_str("⚠️ HIGH CONCENTRATION: Consider diversifying your top holdings");
        } else if concentration > self.thresholds.top3_moderate_pct {
            report.push_str("⚖️ MODERATE CONCENTRATION: Reasonable but watch for over-exposure");
        } else {
            report.push_str("✅ WELL DISTRIBUTED: Good balance across holdings");
        }

        report
    }

    fn recommendations_report(&self, holdings: &[Holding], total: Decimal) -> String {
        let t = &self.thresholds;
        let dust: Vec<&Holding> = holdings
            .iter()
            .filter(|h| h.usd_value > Decimal::ZERO && h.usd_value <= t.dust_value)
            .collect();
        let mut chains: Vec<&str> = holdings.iter().map(|h| h.chain.as_str()).collect();
        chains.sort_unstable();
        chains.dedup();
        let active = holdings.iter().filter(|h| h.usd_value > Decimal::ZERO).count();
        let dominant = holdings.iter().max_by(|a, b| a.usd_value.cmp(&b.usd_value));

        let mut report = String::from("💡 Investment Recommendations\n\n");
        report.push_str("📊 Portfolio Health Check:\n");
        report.push_str(&format!("• Total Value: ${:.2}\n", total));
        report.push_str(&format!("• Active Positions: {}\n", active));
        report.push_str(&format!("• Chains: {}\n", chains.len()));
        report.push_str(&format!("• Dust Positions: {}\n\n", dust.len()));

        let mut advice: Vec<String> = Vec::new();

        if dust.len() > t.dust_cleanup_count {
            advice.push(format!(
                "🧹 CLEANUP: You have {} dust positions (<${}). Consider consolidating \
                 to reduce gas fees.",
                dust.len(),
                t.dust_value
            ));
        }

        if chains.len() == 1 {
            advice.push(format!(
                "🌐 DIVERSIFY: All funds on {}. Consider multi-chain exposure.",
                chains[0].to_uppercase()
            ));
        }

        if let Some(dominant) = dominant {
            if total > Decimal::ZERO && dominant.usd_value / total > t.rebalance_share {
                advice.push(format!(
                    "⚖️ REBALANCE: {} is {:.1}% of portfolio. Consider taking profits.",
                    dominant.symbol,
                    percent_of(dominant.usd_value, total)
                ));
            }
        }

        if total < t.accumulate_total {
            advice.push(
                "📈 ACCUMULATE: Portfolio under $1K. Focus on DCA into blue-chip assets \
                 (ETH, BTC, SOL)."
                    .into(),
            );
        } else if total > t.secure_total {
            advice.push(
                "🔐 SECURE: High-value portfolio. Consider hardware wallet and insurance.".into(),
            );
        }

        let value_on = |name: &str| -> Decimal {
            holdings
                .iter()
                .filter(|h| h.chain == name)
                .map(|h| h.usd_value)
                .sum()
        };
        if value_on("ethereum") > value_on("polygon") + value_on("solana") {
            advice.push(
                "💸 GAS OPTIMIZATION: Heavy Ethereum exposure. Consider moving some assets \
                 to Polygon/Solana for lower fees."
                    .into(),
            );
        }

        report.push_str("🎯 ACTIONABLE RECOMMENDATIONS:\n");
        if advice.is_empty() {
            report.push_str("Your portfolio looks balanced - no immediate actions needed.\n");
        }
        for (index, line) in advice.iter().enumerate() {
            report.push_str(&format!("{}. {}\n\n", index + 1, line));
        }

        report.push_str(
            "💎 Remember: This analysis is based on current market data. Always DYOR \
             (Do Your Own Research)!",
        );
        report
    }

    fn summary_report(portfolio: &Portfolio, holdings: &[Holding], total: Decimal) -> String {
        let active = holdings.iter().filter(|h| h.usd_value > Decimal::ZERO).count();

        let mut report = String::from("📊 Portfolio Overview\n\n");
        report.push_str(&format!("💰 Total Value: ${:.2}\n", total));
        report.push_str(&format!("🔗 Chains: {}\n", portfolio.chains.len()));
        report.push_str(&format!("💎 Active Positions: {}\n\n", active));

        for chain in &portfolio.chains {
            report.push_str(&format!(
                "{}: {:.4} {} (${:.2})",
                chain.name.to_uppercase(),
                chain.balance_value(),
                chain.symbol,
                chain.usd_value
            ));
            if !chain.tokens.is_empty() {
                let plural = if chain.tokens.len() == 1 { "" } else { "s" };
                report.push_str(&format!(" + {} token{}", chain.tokens.len(), plural));
            }
            report.push('\n');
        }

        report
    }

    fn help_text(total: Decimal) -> String {
        format!(
            "🤖 I can analyze your ${:.2} portfolio!\n\nTry asking:\n\n\
             🔍 \"Analyze my portfolio diversification\"\n\
             ⚠️ \"What's my risk exposure?\"\n\
             📈 \"Show me performance insights\"\n\
             💡 \"Give me investment recommendations\"\n\
             📊 \"Portfolio summary\"",
            total
        )
    }
}

/// Percentage of `value` in `total`, zero when the total is zero
fn percent_of(value: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        value / total * dec!(100)
    } else {
        Decimal::ZERO
    }
}
