//! Transfer item classification.
//!
//! Each transfer item of an activity maps to at most one line item. Rules are
//! tried in [`Rule::PRIORITY`] order and the first whose guard matches wins.
//! Guards are not provably exclusive (a DIVIDEND_OR_INTEREST activity can
//! carry an equity transfer item), so overlaps are logged instead of writing
//! two line items for one transfer.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::RegexSet;
use rust_decimal::Decimal;
use tracing::warn;

use crate::documents::{
    deliverable_units, parse_date, Activity, ActivityInstrument, ActivityType, TransferItem,
};
use crate::types::security::AssetType;
use crate::types::transaction::{LineKind, TransactionItem};

/// Descriptions the broker uses for interest postings.
const INTEREST_DESCRIPTIONS: [&str; 8] = [
    r"FREE BALANCE INTEREST ADJUSTMENT~NO DESCRIPTION",
    r"OFF-CYCLE INTEREST~MMDA1",
    r"MARGIN INTEREST ADJUSTMENT~NO DESCRIPTION",
    r"INTEREST INCOME - SECURITIES~.*",
    r"Free Balance Interest Adjustment",
    r"Interest Income - Securities",
    r"BANK INT.*",
    r"SCHWAB1 INT.*",
];

static INTEREST_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(INTEREST_DESCRIPTIONS.iter().map(|p| format!("(?i)^(?:{p})")))
        .expect("interest description patterns are valid")
});

/// Description markers followed by `~SYMBOL`.
const SYMBOL_MARKERS: [&str; 2] = ["dividend~", "foreign tax withheld~"];

const NOT_SPECIFIED: &str = "Not Specified";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    DividendOrInterest,
    Fee,
    Option,
    Future,
    Equity,
    FixedIncome,
}

impl Rule {
    pub const PRIORITY: [Rule; 6] = [
        Rule::DividendOrInterest,
        Rule::Fee,
        Rule::Option,
        Rule::Future,
        Rule::Equity,
        Rule::FixedIncome,
    ];

    pub fn applies(self, activity: ActivityType, asset: AssetType) -> bool {
        match self {
            Rule::DividendOrInterest => activity == ActivityType::DividendOrInterest,
            Rule::Fee => activity == ActivityType::Trade && asset == AssetType::Currency,
            Rule::Option => asset == AssetType::Option,
            Rule::Future => asset == AssetType::Future,
            Rule::Equity => asset == AssetType::Equity,
            Rule::FixedIncome => asset == AssetType::FixedIncome,
        }
    }
}

/// Every rule whose guard matches, in priority order.
pub fn matching_rules(activity: ActivityType, asset: AssetType) -> Vec<Rule> {
    Rule::PRIORITY
        .into_iter()
        .filter(|rule| rule.applies(activity, asset))
        .collect()
}

/// Classifies one transfer item. Pure: the dividend symbol fallback that needs
/// the store is done by the transaction ingestor.
pub fn classify(
    activity: &Activity,
    item: &TransferItem,
    asset: AssetType,
) -> Option<TransactionItem> {
    let rules = matching_rules(activity.kind(), asset);
    let (&rule, shadowed) = rules.split_first()?;
    if !shadowed.is_empty() {
        warn!(
            activity_id = activity.activity_id,
            ?rule,
            ?shadowed,
            "transfer item matches more than one classification rule, using the first"
        );
    }

    let line = match rule {
        Rule::DividendOrInterest => dividend_or_interest(activity, item),
        Rule::Fee => fee(activity, item),
        Rule::Option => option(activity, item),
        Rule::Future => future(activity, item),
        Rule::Equity => equity(activity, item),
        Rule::FixedIncome => fixed_income(activity, item),
    };
    Some(line)
}

/// Interest when a known interest description matches, or when the text
/// mentions interest at all.
pub fn is_interest(description: &str) -> bool {
    if INTEREST_PATTERNS.is_match(description) {
        return true;
    }
    let lower = description.to_lowercase();
    lower.contains("interest") || lower.starts_with("bank int")
}

/// Symbol embedded in descriptions like `ABC CORP DIVIDEND~ABC~0.50`.
pub fn symbol_from_description(description: &str) -> Option<String> {
    let lower = description.to_lowercase();
    if !SYMBOL_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return None;
    }
    description
        .split('~')
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Expiration encoded as MMDDYY at the start of the second `_` segment,
/// e.g. `NFLX_041924P550`.
pub fn expiration_from_symbol(symbol: &str) -> Option<NaiveDate> {
    let segment = symbol.split('_').nth(1)?;
    let digits = segment.get(..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%m%d%y").ok()
}

fn dividend_or_interest(activity: &Activity, item: &TransferItem) -> TransactionItem {
    let description = activity.description();
    let kind = if is_interest(description) { LineKind::Interest } else { LineKind::Dividend };
    let mut line = TransactionItem::new(activity.activity_id, kind, &item.instrument.asset_type);
    line.amount = Some(item.amount);
    line.extended_amount = Some(item.amount);
    if let Some(symbol) = symbol_from_description(description) {
        line.underlying = Some(symbol.clone());
        line.symbol = Some(symbol);
    }
    line
}

fn fee(activity: &Activity, item: &TransferItem) -> TransactionItem {
    let mut line =
        TransactionItem::new(activity.activity_id, LineKind::Fee, &item.instrument.asset_type);
    line.amount = Some(item.amount);
    line.extended_amount = Some(item.amount);
    line.description = Some(item.fee_type.clone().unwrap_or_else(|| NOT_SPECIFIED.to_string()));
    line
}

/// Shared BUY/SELL shape: sign of the amount decides the side.
fn traded(activity: &Activity, item: &TransferItem, asset_type: &str) -> TransactionItem {
    let instrument = &item.instrument;
    let mut line = TransactionItem::new(
        activity.activity_id,
        LineKind::from_signed_amount(item.amount),
        asset_type,
    );
    line.quantity = item.amount.abs();
    line.amount = item.price;
    line.extended_amount = item.cost;
    line.symbol = instrument.symbol.clone();
    line.description = instrument.description.clone();
    line.position_effect = item.position_effect.clone();
    line
}

fn option(activity: &Activity, item: &TransferItem) -> TransactionItem {
    let instrument = &item.instrument;
    let asset_type = instrument.put_call.as_deref().unwrap_or("OPTION");
    let mut line = traded(activity, item, asset_type);
    line.strike_price = instrument.strike_price;
    line.underlying = instrument.underlying_symbol.clone();
    line.expiration_date = option_expiration(instrument);
    line.multiplier = Some(
        deliverable_units(instrument.option_deliverables.as_deref()).unwrap_or(Decimal::ONE),
    );
    line
}

/// Disabled (expired) contracts no longer carry a usable expiration date, so
/// it is read back from the symbol.
fn option_expiration(instrument: &ActivityInstrument) -> Option<NaiveDate> {
    if instrument.is_disabled() {
        let symbol = instrument.symbol.as_deref().unwrap_or_default();
        let expiration = expiration_from_symbol(symbol);
        if expiration.is_none() {
            warn!(symbol, "cannot derive expiration from disabled option symbol");
        }
        return expiration;
    }
    instrument_date(instrument.expiration_date.as_deref())
}

fn future(activity: &Activity, item: &TransferItem) -> TransactionItem {
    let mut line = traded(activity, item, "FUTURE");
    line.expiration_date = instrument_date(item.instrument.expiration_date.as_deref());
    line
}

fn equity(activity: &Activity, item: &TransferItem) -> TransactionItem {
    let mut line = traded(activity, item, "EQUITY");
    line.underlying = item.instrument.symbol.clone();
    line
}

fn fixed_income(activity: &Activity, item: &TransferItem) -> TransactionItem {
    let instrument = &item.instrument;
    let multiplier = instrument.multiplier.unwrap_or(Decimal::ONE);
    let mut line = traded(activity, item, "FIXED_INCOME");
    line.amount = item.price.map(|price| price * multiplier);
    line.multiplier = Some(multiplier);
    line.expiration_date = instrument_date(instrument.maturity_date.as_deref());
    line
}

fn instrument_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    let date = parse_date(raw);
    if date.is_none() {
        warn!(raw, "unparseable instrument date");
    }
    date
}
