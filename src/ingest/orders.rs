//! Order ingestion. An order is stored once and replaced wholesale whenever
//! the broker reports a different status for it.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::documents::{deliverable_units, parse_date, OrderDocument, OrderLeg};
use crate::error::Result;
use crate::persistence::Store;
use crate::types::account::AccountId;
use crate::types::order::{Order, OrderItem, OrderSummary};

pub async fn ingest_orders(
    store: &dyn Store,
    account_id: AccountId,
    orders: &[OrderDocument],
) -> Result<OrderSummary> {
    let mut statuses = store.order_statuses().await?;
    let mut summary = OrderSummary::default();

    for document in orders {
        let order = header(account_id, document);
        let items: Vec<OrderItem> = document
            .order_leg_collection
            .iter()
            .map(|leg| item(account_id, document.order_id, leg))
            .collect();

        match statuses.get(&document.order_id) {
            None => {
                store.insert_order(&order, &items).await?;
                summary.new_count += 1;
            }
            Some(status) if *status == document.status => {
                debug!(order_id = document.order_id, status = %status, "order unchanged");
                summary.skipped_count += 1;
                continue;
            }
            Some(previous) => {
                info!(
                    order_id = document.order_id,
                    from = %previous,
                    to = %document.status,
                    "order status changed"
                );
                store.replace_order(&order, &items).await?;
                summary.updated_count += 1;
            }
        }
        statuses.insert(document.order_id, document.status.clone());
    }

    info!(
        account_id,
        new = summary.new_count,
        updated = summary.updated_count,
        skipped = summary.skipped_count,
        "orders ingested"
    );
    Ok(summary)
}

fn header(account_id: AccountId, document: &OrderDocument) -> Order {
    Order {
        account_id,
        order_id: document.order_id,
        entered_time: document.entered_time,
        cancel_time: document.cancel_time,
        close_time: document.close_time,
        order_type: document.order_type.clone(),
        order_class: document.order_class.clone(),
        order_strategy_type: document.order_strategy_type.clone(),
        order_duration: document.order_duration.clone(),
        requested_destination: document.requested_destination.clone(),
        status: document.status.clone(),
        price: document.price,
        quantity: document.quantity,
        filled_quantity: document.filled_quantity,
        remaining_quantity: document.remaining_quantity,
    }
}

fn item(account_id: AccountId, order_id: i64, leg: &OrderLeg) -> OrderItem {
    let instrument = &leg.instrument;
    let is_option = instrument.asset_type == "OPTION";
    let (strike_price, multiplier) = if is_option {
        let strike = instrument.symbol.as_deref().and_then(strike_from_symbol);
        let multiplier = deliverable_units(instrument.option_deliverables.as_deref())
            .unwrap_or(Decimal::ONE);
        (strike, multiplier)
    } else {
        (None, Decimal::ONE)
    };

    OrderItem {
        account_id,
        order_id,
        order_item_id: leg.leg_id,
        order_leg_type: leg.order_leg_type.clone(),
        instruction: leg.instruction.clone(),
        quantity: leg.quantity,
        asset_type: Some(instrument.asset_type.clone()),
        symbol: instrument.symbol.clone(),
        cusip: instrument.cusip.clone(),
        description: instrument.description.clone(),
        put_call: instrument.put_call.clone(),
        underlying: instrument.underlying_symbol.clone(),
        maturity_date: instrument.maturity_date.as_deref().and_then(parse_date),
        strike_price,
        multiplier,
        position_effect: leg.position_effect.clone(),
    }
}

/// Strike encoded in the OCC option symbol: the six digits before the last
/// two, in tenths of a dollar. `NFLX  240419P00550000` gives 550.
pub fn strike_from_symbol(symbol: &str) -> Option<Decimal> {
    let end = symbol.len().checked_sub(2)?;
    let start = symbol.len().checked_sub(8)?;
    let digits = symbol.get(start..end)?;
    let tenths: i64 = digits.parse().ok()?;
    Some(Decimal::new(tenths, 1).normalize())
}
